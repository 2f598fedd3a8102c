//! Keypoint detections produced by the external pose model.

use serde::{Deserialize, Serialize};

/// A single anatomical keypoint detection in normalized frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeypointDetection {
    /// Index of the keypoint within the model's output, in detection order
    pub index: usize,
    /// Vertical position (0.0 = top, 1.0 = bottom)
    pub y: f64,
    /// Horizontal position (0.0 = left, 1.0 = right)
    pub x: f64,
    /// Detection confidence score (0.0-1.0)
    pub confidence: f64,
}

impl KeypointDetection {
    /// Create a new keypoint detection.
    pub fn new(index: usize, y: f64, x: f64, confidence: f64) -> Self {
        Self {
            index,
            y,
            x,
            confidence,
        }
    }

    /// Whether the detection clears the given confidence threshold.
    #[inline]
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_threshold() {
        let kp = KeypointDetection::new(0, 0.5, 0.5, 0.3);
        assert!(!kp.is_confident(0.3), "threshold is exclusive");
        assert!(kp.is_confident(0.29));
    }

    #[test]
    fn test_serde_round_trip() {
        let kp = KeypointDetection::new(4, 0.25, 0.75, 0.9);
        let json = serde_json::to_string(&kp).unwrap();
        let back: KeypointDetection = serde_json::from_str(&json).unwrap();
        assert_eq!(kp, back);
    }
}
