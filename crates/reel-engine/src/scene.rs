//! Frame-difference signal for scene-cut detection.
//!
//! The only consumer of decoded pixels in the engine: a scalar mean squared
//! error between consecutive luminance frames, compared against a fixed
//! threshold to flag shot changes. Anything pixel-related beyond this
//! belongs to the external decoder.

use crate::error::{EngineError, EngineResult};
use reel_models::LumaFrame;
use tracing::debug;

/// Mean squared error between two luminance frames of identical shape.
pub fn mean_squared_error(a: &LumaFrame, b: &LumaFrame) -> EngineResult<f64> {
    if !a.same_shape(b) || a.data.len() != b.data.len() {
        return Err(EngineError::LumaShapeMismatch {
            expected_width: a.width,
            expected_height: a.height,
            actual_width: b.width,
            actual_height: b.height,
        });
    }

    let sum: f64 = a
        .data
        .iter()
        .zip(&b.data)
        .map(|(&p, &q)| {
            let d = p as f64 - q as f64;
            d * d
        })
        .sum();

    Ok(sum / (a.width as f64 * a.height as f64))
}

/// Whether a frame difference crosses the scene-cut threshold.
#[inline]
pub fn is_scene_cut(frame_diff: f64, threshold: f64) -> bool {
    frame_diff > threshold
}

/// Rolling frame-difference state for one stream.
///
/// Owns the previous luminance frame explicitly; one instance per run,
/// never shared between concurrent runs.
#[derive(Debug, Default)]
pub struct FrameDiff {
    prev: Option<LumaFrame>,
}

impl FrameDiff {
    /// Create an empty differencer.
    pub fn new() -> Self {
        Self { prev: None }
    }

    /// Difference between `frame` and the previously pushed frame.
    ///
    /// The first frame of a stream has nothing to diff against and always
    /// reports 0.0, so it can never register as a scene cut.
    pub fn push(&mut self, frame: LumaFrame) -> EngineResult<f64> {
        let diff = match &self.prev {
            Some(prev) => mean_squared_error(prev, &frame)?,
            None => 0.0,
        };
        self.prev = Some(frame);
        debug!(diff, "frame difference");
        Ok(diff)
    }

    /// Drop the held frame, e.g. when a run is restarted.
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_frames_have_zero_error() {
        let a = LumaFrame::filled(8, 8, 100);
        assert_eq!(mean_squared_error(&a, &a.clone()).unwrap(), 0.0);
    }

    #[test]
    fn test_uniform_delta_error() {
        let a = LumaFrame::filled(8, 8, 100);
        let b = LumaFrame::filled(8, 8, 110);
        // Every pixel differs by 10, so the MSE is exactly 100.
        assert_eq!(mean_squared_error(&a, &b).unwrap(), 100.0);
    }

    #[test]
    fn test_shape_mismatch_is_fatal() {
        let a = LumaFrame::filled(8, 8, 0);
        let b = LumaFrame::filled(4, 8, 0);
        assert_eq!(
            mean_squared_error(&a, &b),
            Err(EngineError::LumaShapeMismatch {
                expected_width: 8,
                expected_height: 8,
                actual_width: 4,
                actual_height: 8,
            })
        );
    }

    #[test]
    fn test_first_frame_is_never_a_cut() {
        let mut diff = FrameDiff::new();
        let d = diff.push(LumaFrame::filled(8, 8, 255)).unwrap();
        assert_eq!(d, 0.0);
        assert!(!is_scene_cut(d, 3000.0));
    }

    #[test]
    fn test_hard_cut_exceeds_threshold() {
        let mut diff = FrameDiff::new();
        diff.push(LumaFrame::filled(8, 8, 0)).unwrap();
        let d = diff.push(LumaFrame::filled(8, 8, 255)).unwrap();
        assert!(is_scene_cut(d, 3000.0));
    }

    #[test]
    fn test_reset_clears_held_frame() {
        let mut diff = FrameDiff::new();
        diff.push(LumaFrame::filled(8, 8, 0)).unwrap();
        diff.reset();
        let d = diff.push(LumaFrame::filled(8, 8, 255)).unwrap();
        assert_eq!(d, 0.0);
    }
}
