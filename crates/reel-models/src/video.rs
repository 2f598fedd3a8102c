//! Video source metadata.

use serde::{Deserialize, Serialize};

/// Metadata for a video source, as reported by the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: f64,
    /// Total number of frames in the source
    pub frame_count: u64,
}

impl VideoMetadata {
    /// Create new video metadata.
    pub fn new(width: u32, height: u32, fps: f64, frame_count: u64) -> Self {
        Self {
            width,
            height,
            fps,
            frame_count,
        }
    }

    /// Whether the metadata describes a usable source.
    ///
    /// Zero dimensions or a non-positive frame rate mean the source could
    /// not be opened correctly and no pass should begin.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.fps.is_finite() && self.fps > 0.0
    }
}
