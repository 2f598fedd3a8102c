//! Error types for the reframing engine.

use reel_models::VideoMetadata;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while planning a reframe.
///
/// Expected per-frame conditions -- no detection, scene cuts, out-of-range
/// frame requests -- are never errors; they are handled with defined
/// fallbacks (hold last position, default center, clamped range).
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("invalid video source: {width}x{height} @ {fps} fps")]
    InvalidSource { width: u32, height: u32, fps: f64 },

    #[error(
        "luminance frame shape changed: expected {expected_width}x{expected_height}, \
         got {actual_width}x{actual_height}"
    )]
    LumaShapeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

impl EngineError {
    /// Create an invalid-source error from the offending metadata.
    pub fn invalid_source(metadata: &VideoMetadata) -> Self {
        Self::InvalidSource {
            width: metadata.width,
            height: metadata.height,
            fps: metadata.fps,
        }
    }
}
