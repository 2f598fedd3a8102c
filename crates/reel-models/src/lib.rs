//! Shared data models for the Reelframe reframing engine.
//!
//! This crate provides serde-serializable types exchanged between the
//! external decode/inference collaborators and the reframing core:
//! - Keypoint detections from the pose model
//! - Video metadata from the source container
//! - Frame ranges for multi-crop runs
//! - Luminance frames for scene-cut differencing

pub mod keypoint;
pub mod luma;
pub mod range;
pub mod video;

// Re-export common types
pub use keypoint::KeypointDetection;
pub use luma::LumaFrame;
pub use range::{FrameRange, RangeParseError};
pub use video::VideoMetadata;
