//! Configuration for the reframing engine.

use crate::crop::AspectRatio;
use serde::{Deserialize, Serialize};

/// Fallback horizontal/vertical center when nothing is known about the
/// subject (normalized, 0.5 = frame center).
pub const DEFAULT_CENTER: f64 = 0.5;

/// Tuning parameters for detection aggregation, scene cuts, movement
/// planning, and crop geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReframeConfig {
    // === Detection ===
    /// Minimum keypoint confidence to consider (default: 0.3)
    pub detection_confidence: f64,

    /// Maximum normalized distance between a detection and a cluster's
    /// running centroid for them to merge (default: 0.05)
    pub cluster_radius: f64,

    // === Scene cuts ===
    /// Frame-difference (luminance MSE) above which a frame is treated as a
    /// scene cut (default: 3000.0)
    pub scene_change_threshold: f64,

    // === Movement planning (pass 1) ===
    /// Fallback center when no subject has ever been seen (default: 0.5)
    pub default_center: f64,

    /// Maximum per-frame camera step in normalized units (default: 0.03)
    pub max_movement_per_frame: f64,

    /// Distance to target below which the camera counts as caught up
    /// (default: 0.1)
    pub fast_transition_threshold: f64,

    /// Weight of the recent-position mean once centering engages
    /// (default: 0.4)
    pub centering_weight: f64,

    /// Number of accepted positions kept for the centering blend
    /// (default: 3)
    pub position_history_len: usize,

    /// Sustained catch-up time before centering engages, in seconds
    /// (default: 0.5)
    pub stable_seconds: f64,

    // === Smoothing (pass 2) ===
    /// Base ease rate applied per frame (default: 0.1)
    pub base_alpha: f64,

    /// Delta magnitude below which no movement is applied (default: 0.015)
    pub deadband: f64,

    /// Delta below which the ease rate is halved again for the final
    /// approach (default: 0.1)
    pub final_approach_threshold: f64,

    // === Crop geometry ===
    /// Output crop aspect ratio; crop width derives from the full source
    /// height (default: 9:16)
    pub aspect_ratio: AspectRatio,

    // === Online tracking ===
    /// Parameters for the online subject tracker
    pub tracker: TrackerConfig,
}

impl Default for ReframeConfig {
    fn default() -> Self {
        Self {
            detection_confidence: 0.3,
            cluster_radius: 0.05,
            scene_change_threshold: 3000.0,
            default_center: DEFAULT_CENTER,
            max_movement_per_frame: 0.03,
            fast_transition_threshold: 0.1,
            centering_weight: 0.4,
            position_history_len: 3,
            stable_seconds: 0.5,
            base_alpha: 0.1,
            deadband: 0.015,
            final_approach_threshold: 0.1,
            aspect_ratio: AspectRatio::PORTRAIT,
            tracker: TrackerConfig::default(),
        }
    }
}

/// Tuning parameters for the online subject tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Consecutive confirming frames before a rival subject wins, and the
    /// no-detection buffer before resetting to center (default: 30)
    pub wait_frames: u32,

    /// Cooldown after a committed switch during which further switching is
    /// suppressed (default: 45)
    pub lock_frames: u32,

    /// Pixel distance beyond which a displaced candidate is adopted
    /// immediately as an unambiguous subject change (default: 30.0)
    pub movement_threshold_px: f64,

    /// Confidence margin a rival must clear over the current subject before
    /// it can contest at all (default: 0.15)
    pub confidence_margin: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            wait_frames: 30,
            lock_frames: 45,
            movement_threshold_px: 30.0,
            confidence_margin: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_canonical_values() {
        let config = ReframeConfig::default();
        assert_eq!(config.detection_confidence, 0.3);
        assert_eq!(config.cluster_radius, 0.05);
        assert_eq!(config.scene_change_threshold, 3000.0);
        assert_eq!(config.max_movement_per_frame, 0.03);
        assert_eq!(config.deadband, 0.015);
        assert_eq!(config.tracker.wait_frames, 30);
        assert_eq!(config.tracker.lock_frames, 45);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ReframeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ReframeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.base_alpha, config.base_alpha);
        assert_eq!(back.aspect_ratio, config.aspect_ratio);
        assert_eq!(back.tracker.movement_threshold_px, 30.0);
    }
}
