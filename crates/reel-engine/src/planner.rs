//! Offline two-pass movement planning.
//!
//! Pass 1 ([`MovementPlanner::observe`]) walks the frame sequence once,
//! recording a raw target center per frame: it pins to the default center on
//! scene cuts, backfills the gap once the first detection after a cut
//! arrives, rate-limits camera steps, and damps micro-jitter once the camera
//! has caught up. Pass 2 ([`MovementPlanner::smoothed_centers`]) re-walks
//! each scene segment independently with a decelerating ease to produce the
//! final per-frame centers.

use crate::cluster::SubjectCluster;
use crate::config::ReframeConfig;
use crate::scene::is_scene_cut;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// One processed frame's raw planning record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame index within the run
    pub frame: u64,
    /// Raw target horizontal center (normalized)
    pub x: f64,
    /// Whether this frame opened a new scene
    pub is_scene_change: bool,
}

/// A maximal run of frames between two consecutive scene cuts.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSegment {
    /// First frame of the segment (inclusive)
    pub start: u64,
    /// Last frame of the segment (inclusive)
    pub end: u64,
    /// Raw centers recorded for the segment, in frame order
    pub positions: Vec<f64>,
}

/// Two-pass movement planner for one video run.
///
/// Owns its frame records exclusively for the duration of the run; records
/// are appended in frame order and mutated retroactively only for the
/// bounded backfill after a scene cut.
#[derive(Debug)]
pub struct MovementPlanner {
    config: ReframeConfig,
    records: Vec<FrameRecord>,
    current_scene_start: u64,
    waiting_for_detection: bool,
    position_history: VecDeque<f64>,
    stable_frames: u32,
    stable_frames_required: u32,
    is_centering: bool,
}

impl MovementPlanner {
    /// Create a planner for a stream at the given frame rate.
    pub fn new(config: &ReframeConfig, fps: f64) -> Self {
        let stable_frames_required = (fps * config.stable_seconds) as u32;
        Self {
            config: config.clone(),
            records: Vec::new(),
            current_scene_start: 0,
            waiting_for_detection: false,
            position_history: VecDeque::new(),
            stable_frames: 0,
            stable_frames_required,
            is_centering: false,
        }
    }

    /// Record one frame of the first pass.
    ///
    /// `cluster` is the frame's primary candidate, if any; `frame_diff` is
    /// the luminance MSE against the previous frame.
    pub fn observe(&mut self, frame: u64, cluster: Option<&SubjectCluster>, frame_diff: f64) {
        // The very first frame has no predecessor to diff against and is
        // never a scene cut.
        if is_scene_cut(frame_diff, self.config.scene_change_threshold) && !self.records.is_empty()
        {
            self.position_history.clear();
            self.stable_frames = 0;
            self.is_centering = false;
            self.records.push(FrameRecord {
                frame,
                x: self.config.default_center,
                is_scene_change: true,
            });
            self.current_scene_start = frame;
            self.waiting_for_detection = true;
            debug!(frame, frame_diff, "scene cut; pinning to center");
            return;
        }

        if self.waiting_for_detection {
            if let Some(cluster) = cluster {
                // First detection after the cut: rewrite the held frames so
                // the camera starts the scene on the subject instead of
                // snapping out from center.
                for record in &mut self.records {
                    if record.frame >= self.current_scene_start && !record.is_scene_change {
                        record.x = cluster.x;
                    }
                }
                self.waiting_for_detection = false;
                debug!(frame, x = cluster.x, "backfilled scene start to first detection");
                return;
            }
        }

        let mut target = match (cluster, self.records.last()) {
            (Some(c), _) => c.x,
            (None, Some(last)) => last.x,
            (None, None) => self.config.default_center,
        };

        if let Some(last) = self.records.last() {
            let last_x = last.x;
            let distance = (target - last_x).abs();

            // Rate-limit the step toward the raw target.
            let step = target - last_x;
            if step.abs() > self.config.max_movement_per_frame {
                target = last_x + self.config.max_movement_per_frame.copysign(step);
            }

            // Stability accounting uses the pre-clamp distance.
            if distance < self.config.fast_transition_threshold {
                self.stable_frames += 1;
                if self.stable_frames >= self.stable_frames_required {
                    self.is_centering = true;
                }
            } else {
                self.stable_frames = 0;
                self.is_centering = false;
                self.position_history.clear();
            }

            if self.is_centering {
                self.position_history.push_back(target);
                if self.position_history.len() > self.config.position_history_len {
                    self.position_history.pop_front();
                }
                if self.position_history.len() > 1 {
                    let mean = self.position_history.iter().sum::<f64>()
                        / self.position_history.len() as f64;
                    target = target * (1.0 - self.config.centering_weight)
                        + mean * self.config.centering_weight;
                }
            }
        }

        self.records.push(FrameRecord {
            frame,
            x: target,
            is_scene_change: false,
        });
    }

    /// Raw pass-1 records, in frame order.
    pub fn records(&self) -> &[FrameRecord] {
        &self.records
    }

    /// Partition the records into per-scene segments.
    ///
    /// Each flagged frame closes the previous segment and opens its own,
    /// contributing its pinned center as the new segment's first position.
    /// Segments are contiguous and cover every recorded frame exactly once.
    pub fn scene_segments(&self) -> Vec<SceneSegment> {
        let mut segments = Vec::new();
        let mut start = 0u64;
        let mut positions: Vec<f64> = Vec::new();

        for (i, record) in self.records.iter().enumerate() {
            if record.is_scene_change && i > 0 {
                segments.push(SceneSegment {
                    start,
                    end: record.frame - 1,
                    positions: std::mem::take(&mut positions),
                });
                start = record.frame;
            }
            positions.push(record.x);
        }

        if !positions.is_empty() {
            if let Some(last) = self.records.last() {
                segments.push(SceneSegment {
                    start,
                    end: last.frame,
                    positions,
                });
            }
        }

        segments
    }

    /// Second pass: smooth each scene segment independently.
    ///
    /// A decelerating ease walks each segment's raw positions in order; the
    /// rate scales down with the remaining distance and halves again on the
    /// final approach, while deltas inside the deadband hold position.
    /// Segments never smooth into each other, and frames not covered by any
    /// segment stay at the default center.
    pub fn smoothed_centers(&self, total_frames: u64) -> Vec<f64> {
        let mut centers = vec![self.config.default_center; total_frames as usize];

        for segment in self.scene_segments() {
            let Some(&first) = segment.positions.first() else {
                continue;
            };
            let mut last_x = first;

            for (i, frame) in (segment.start..=segment.end).enumerate() {
                let Some(&target) = segment.positions.get(i) else {
                    break;
                };
                let delta = target - last_x;

                let smoothed = if delta.abs() < self.config.deadband {
                    last_x
                } else {
                    let distance_factor = (delta.abs() * 2.0).min(1.0);
                    let mut alpha = self.config.base_alpha * distance_factor;
                    if delta.abs() < self.config.final_approach_threshold {
                        alpha *= 0.5;
                    }
                    last_x + alpha * delta
                };

                if let Some(slot) = centers.get_mut(frame as usize) {
                    *slot = smoothed;
                }
                last_x = smoothed;
            }
        }

        centers
    }
}
