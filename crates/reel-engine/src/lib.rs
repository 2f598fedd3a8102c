//! Subject-aware reframing engine for converting landscape video into
//! vertical crops.
//!
//! The engine consumes per-frame pose keypoints and luminance planes from an
//! external decoder/detector and produces per-frame crop windows. Decoding,
//! inference, and encoding stay outside; everything here is deterministic
//! geometry and planning:
//!
//! - [`cluster`]: groups raw keypoints into per-subject clusters
//! - [`scene`]: frame-difference signal for scene-cut detection
//! - [`planner`]: offline two-pass movement planning over a full run
//! - [`tracker`]: online single-pass subject tracking with hysteresis
//! - [`crop`]: maps normalized centers to clamped pixel crop windows
//!
//! [`ReframeEngine`] wires the offline path together; streaming callers use
//! [`SubjectTracker`] directly.

pub mod cluster;
pub mod config;
pub mod crop;
pub mod error;
pub mod planner;
pub mod scene;
pub mod tracker;

pub use cluster::{aggregate, aggregate_confident, primary, SubjectCluster};
pub use config::{ReframeConfig, TrackerConfig, DEFAULT_CENTER};
pub use crop::{map_crop_window, AspectRatio, CropWindow};
pub use error::{EngineError, EngineResult};
pub use planner::{FrameRecord, MovementPlanner, SceneSegment};
pub use scene::{is_scene_cut, mean_squared_error, FrameDiff};
pub use tracker::{SubjectTracker, TrackerEvent};

use reel_models::{FrameRange, KeypointDetection, LumaFrame, VideoMetadata};
use tracing::info;

/// One frame's worth of detector output for the offline pass.
#[derive(Debug, Clone)]
pub struct FrameObservation {
    /// Raw pose keypoints for the frame, unfiltered
    pub keypoints: Vec<KeypointDetection>,
    /// Luminance plane, used only for frame differencing
    pub luma: LumaFrame,
}

impl FrameObservation {
    /// Create a new frame observation.
    pub fn new(keypoints: Vec<KeypointDetection>, luma: LumaFrame) -> Self {
        Self { keypoints, luma }
    }
}

/// Offline reframing pipeline for one video source.
///
/// Holds only configuration and source metadata; each call to
/// [`plan_centers`](Self::plan_centers) runs a fresh plan, so the same
/// observations always produce the same centers.
#[derive(Debug, Clone)]
pub struct ReframeEngine {
    config: ReframeConfig,
    metadata: VideoMetadata,
}

impl ReframeEngine {
    /// Create an engine for a source, rejecting unusable metadata up front.
    pub fn new(config: ReframeConfig, metadata: VideoMetadata) -> EngineResult<Self> {
        if !metadata.is_valid() {
            return Err(EngineError::invalid_source(&metadata));
        }
        Ok(Self { config, metadata })
    }

    /// The engine's configuration.
    pub fn config(&self) -> &ReframeConfig {
        &self.config
    }

    /// The source metadata the engine was created with.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Resolve an optional start/end request against the source length.
    ///
    /// Missing bounds default to the full source; out-of-range bounds are
    /// narrowed rather than rejected.
    pub fn clamp_range(&self, start: Option<u64>, end: Option<u64>) -> FrameRange {
        FrameRange::new(
            start.unwrap_or(0),
            end.unwrap_or(self.metadata.frame_count),
        )
        .clamp_to(self.metadata.frame_count)
    }

    /// Run the full offline plan over a frame sequence.
    ///
    /// Returns one smoothed horizontal center per observed frame. Frames are
    /// assumed consecutive starting at the beginning of the requested range.
    pub fn plan_centers<I>(&self, observations: I) -> EngineResult<Vec<f64>>
    where
        I: IntoIterator<Item = FrameObservation>,
    {
        let mut frame_diff = FrameDiff::new();
        let mut planner = MovementPlanner::new(&self.config, self.metadata.fps);
        let mut total: u64 = 0;

        for (frame, obs) in observations.into_iter().enumerate() {
            let diff = frame_diff.push(obs.luma)?;
            let clusters = aggregate_confident(
                &obs.keypoints,
                self.config.detection_confidence,
                self.config.cluster_radius,
            );
            planner.observe(frame as u64, primary(&clusters), diff);
            total += 1;
        }

        info!(
            frames = total,
            segments = planner.scene_segments().len(),
            "movement plan complete"
        );
        Ok(planner.smoothed_centers(total))
    }

    /// Map planned centers to pixel crop windows, one per frame.
    pub fn crop_windows(&self, centers: &[f64]) -> Vec<CropWindow> {
        centers
            .iter()
            .map(|&c| map_crop_window(c, &self.metadata, self.config.aspect_ratio))
            .collect()
    }
}
