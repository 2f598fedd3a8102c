//! Online subject tracking for streaming pipelines.
//!
//! Incremental counterpart to the offline planner: one cluster update per
//! frame, bounded state, and a hysteresis buffer so the camera does not
//! ping-pong between subjects of similar confidence. Rival subjects must
//! out-score the current one by a margin for a sustained run of frames
//! before a switch commits, after which a lock suppresses further switching
//! for a cooldown period.

use crate::cluster::SubjectCluster;
use crate::config::{TrackerConfig, DEFAULT_CENTER};
use crate::scene::is_scene_cut;
use reel_models::VideoMetadata;
use std::fmt;
use tracing::{debug, info};

/// Confidence-weighted blend of two positions on one axis.
///
/// Falls back to the plain midpoint when both confidences are zero.
pub fn confidence_weighted_midpoint(conf_a: f64, a: f64, conf_b: f64, b: f64) -> f64 {
    let total = conf_a + conf_b;
    if total <= 0.0 {
        return (a + b) / 2.0;
    }
    (conf_a * a + conf_b * b) / total
}

/// Linear blend pulling `current` toward `target` by `weight`.
pub fn confidence_lerp(weight: f64, target: f64, current: f64) -> f64 {
    weight * target + (1.0 - weight) * current
}

/// A rival subject being buffered before a switch can commit.
#[derive(Debug, Default)]
struct PendingCandidate {
    id: Option<usize>,
    confidence: f64,
    frames: u32,
}

/// Outcome of one tracker update, for logging and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    /// A scene cut reset the tracker to center.
    SceneReset,
    /// First subject adopted.
    Initialized { id: usize },
    /// The candidate moved too far to be the same subject; adopted
    /// immediately.
    DisplacementSwitch { id: usize },
    /// Still following the current subject.
    Following { id: usize },
    /// A rival failed to clear the confidence margin.
    WeakRival { current: usize },
    /// A strong rival arrived during the post-switch lock.
    LockHeld { current: usize },
    /// A strong rival is being buffered toward a switch.
    RivalPending { id: usize, frames: u32, required: u32 },
    /// A buffered rival won; the tracker switched and locked.
    Switched { id: usize },
    /// No detection this frame; holding the last position.
    Holding { lost: u32, limit: u32 },
    /// No detection for the full buffer; reset to center.
    LostReset,
}

impl fmt::Display for TrackerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerEvent::SceneReset => write!(f, "Scene change detected. Resetting to center."),
            TrackerEvent::Initialized { id } => write!(f, "Initializing on subject {id}."),
            TrackerEvent::DisplacementSwitch { id } => {
                write!(f, "Subject moved too far. Switching to subject {id}.")
            }
            TrackerEvent::Following { id } => write!(f, "Following subject {id}."),
            TrackerEvent::WeakRival { current } => write!(
                f,
                "Candidate not strong enough; continuing on subject {current}."
            ),
            TrackerEvent::LockHeld { current } => {
                write!(f, "In lock; continuing on subject {current}.")
            }
            TrackerEvent::RivalPending {
                id,
                frames,
                required,
            } => {
                if *frames == 1 {
                    write!(f, "Candidate switch to subject {id} started. (1/{required})")
                } else {
                    write!(
                        f,
                        "Buffering candidate switch to subject {id}... ({frames}/{required})"
                    )
                }
            }
            TrackerEvent::Switched { id } => write!(f, "Switched to subject {id}. Lock initiated."),
            TrackerEvent::Holding { lost, limit } => {
                write!(f, "No detection; holding last position ({lost}/{limit}).")
            }
            TrackerEvent::LostReset => {
                write!(f, "No detection for buffer duration. Resetting to center.")
            }
        }
    }
}

/// Hysteresis-based online subject tracker.
///
/// State is bounded and per-stream; one instance per run. Positions are
/// normalized, with displacement checks done in source pixel space.
#[derive(Debug)]
pub struct SubjectTracker {
    config: TrackerConfig,
    frame_width: f64,
    frame_height: f64,
    current_id: Option<usize>,
    current_confidence: f64,
    position: (f64, f64),
    lost_frames: u32,
    lock_countdown: u32,
    pending: PendingCandidate,
}

impl SubjectTracker {
    /// Create a tracker for a stream with the given source dimensions.
    pub fn new(config: &TrackerConfig, metadata: &VideoMetadata) -> Self {
        Self {
            config: config.clone(),
            frame_width: metadata.width as f64,
            frame_height: metadata.height as f64,
            current_id: None,
            current_confidence: 0.0,
            position: (DEFAULT_CENTER, DEFAULT_CENTER),
            lost_frames: 0,
            lock_countdown: 0,
            pending: PendingCandidate::default(),
        }
    }

    /// Current tracked position (normalized x, y).
    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    /// Identity of the subject currently being followed, if any.
    pub fn current_id(&self) -> Option<usize> {
        self.current_id
    }

    /// Advance the tracker by one frame.
    ///
    /// `cluster` is the frame's primary candidate, if any; `frame_diff` is
    /// the luminance MSE against the previous frame, compared to
    /// `scene_change_threshold` for cut detection.
    pub fn update(
        &mut self,
        cluster: Option<&SubjectCluster>,
        frame_diff: f64,
        scene_change_threshold: f64,
    ) -> TrackerEvent {
        if is_scene_cut(frame_diff, scene_change_threshold) {
            self.reset();
            debug!(frame_diff, "{}", TrackerEvent::SceneReset);
            return TrackerEvent::SceneReset;
        }

        // The lock covers exactly `lock_frames` frames after a switch.
        let locked = self.lock_countdown > 0;
        self.lock_countdown = self.lock_countdown.saturating_sub(1);

        let Some(cluster) = cluster else {
            return self.handle_no_detection();
        };
        self.lost_frames = 0;

        let Some(current_id) = self.current_id else {
            self.adopt(cluster);
            debug!("{}", TrackerEvent::Initialized { id: cluster.id });
            return TrackerEvent::Initialized { id: cluster.id };
        };

        // A large jump is an unambiguous subject change regardless of
        // identity or confidence.
        if self.pixel_distance(cluster) > self.config.movement_threshold_px {
            self.adopt(cluster);
            debug!("{}", TrackerEvent::DisplacementSwitch { id: cluster.id });
            return TrackerEvent::DisplacementSwitch { id: cluster.id };
        }

        if cluster.id == current_id {
            self.position = (cluster.x, cluster.y);
            self.current_confidence = cluster.confidence;
            self.pending = PendingCandidate::default();
            return TrackerEvent::Following { id: current_id };
        }

        if cluster.confidence <= self.current_confidence + self.config.confidence_margin {
            self.position = (cluster.x, cluster.y);
            self.pending = PendingCandidate::default();
            return TrackerEvent::WeakRival {
                current: current_id,
            };
        }

        if locked {
            self.position = (cluster.x, cluster.y);
            return TrackerEvent::LockHeld {
                current: current_id,
            };
        }

        if self.pending.id != Some(cluster.id) {
            self.pending = PendingCandidate {
                id: Some(cluster.id),
                confidence: cluster.confidence,
                frames: 1,
            };
            self.blend_pending(cluster);
            let event = TrackerEvent::RivalPending {
                id: cluster.id,
                frames: 1,
                required: self.config.wait_frames,
            };
            debug!("{event}");
            return event;
        }

        self.blend_pending(cluster);
        self.pending.frames += 1;

        if self.pending.frames >= self.config.wait_frames {
            let weight = self.pending.confidence;
            self.current_id = self.pending.id;
            self.current_confidence = self.pending.confidence;
            self.position = (
                confidence_lerp(weight, cluster.x, self.position.0),
                confidence_lerp(weight, cluster.y, self.position.1),
            );
            self.lock_countdown = self.config.lock_frames;
            self.pending = PendingCandidate::default();
            info!("{}", TrackerEvent::Switched { id: cluster.id });
            return TrackerEvent::Switched { id: cluster.id };
        }

        TrackerEvent::RivalPending {
            id: cluster.id,
            frames: self.pending.frames,
            required: self.config.wait_frames,
        }
    }

    /// Clear all tracking state back to the frame center.
    pub fn reset(&mut self) {
        self.current_id = None;
        self.current_confidence = 0.0;
        self.position = (DEFAULT_CENTER, DEFAULT_CENTER);
        self.lost_frames = 0;
        self.lock_countdown = 0;
        self.pending = PendingCandidate::default();
    }

    fn handle_no_detection(&mut self) -> TrackerEvent {
        self.lost_frames += 1;
        if self.lost_frames >= self.config.wait_frames {
            self.reset();
            debug!("{}", TrackerEvent::LostReset);
            return TrackerEvent::LostReset;
        }
        TrackerEvent::Holding {
            lost: self.lost_frames,
            limit: self.config.wait_frames,
        }
    }

    fn adopt(&mut self, cluster: &SubjectCluster) {
        self.current_id = Some(cluster.id);
        self.current_confidence = cluster.confidence;
        self.position = (cluster.x, cluster.y);
        self.pending = PendingCandidate::default();
    }

    fn pixel_distance(&self, cluster: &SubjectCluster) -> f64 {
        let dx = (cluster.x - self.position.0) * self.frame_width;
        let dy = (cluster.y - self.position.1) * self.frame_height;
        (dx * dx + dy * dy).sqrt()
    }

    /// Pull the tracked position toward a buffered rival, weighted by the
    /// rival's stored confidence against the current subject's.
    fn blend_pending(&mut self, cluster: &SubjectCluster) {
        self.position = (
            confidence_weighted_midpoint(
                self.pending.confidence,
                cluster.x,
                self.current_confidence,
                self.position.0,
            ),
            confidence_weighted_midpoint(
                self.pending.confidence,
                cluster.y,
                self.current_confidence,
                self.position.1,
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SubjectTracker {
        SubjectTracker::new(
            &TrackerConfig::default(),
            &VideoMetadata::new(1920, 1080, 30.0, 900),
        )
    }

    fn subject(id: usize, x: f64, confidence: f64) -> SubjectCluster {
        SubjectCluster {
            id,
            x,
            y: 0.5,
            confidence,
        }
    }

    #[test]
    fn test_weighted_midpoint() {
        assert_eq!(confidence_weighted_midpoint(0.5, 0.0, 0.5, 1.0), 0.5);
        assert!((confidence_weighted_midpoint(0.9, 1.0, 0.1, 0.0) - 0.9).abs() < 1e-9);
        // Zero total confidence falls back to the plain midpoint.
        assert_eq!(confidence_weighted_midpoint(0.0, 0.2, 0.0, 0.8), 0.5);
    }

    #[test]
    fn test_confidence_lerp() {
        assert_eq!(confidence_lerp(0.0, 1.0, 0.4), 0.4);
        assert_eq!(confidence_lerp(1.0, 1.0, 0.4), 1.0);
        assert!((confidence_lerp(0.25, 1.0, 0.0) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_initializes_on_first_subject() {
        let mut t = tracker();
        let event = t.update(Some(&subject(0, 0.6, 0.8)), 0.0, 3000.0);
        assert_eq!(event, TrackerEvent::Initialized { id: 0 });
        assert_eq!(t.current_id(), Some(0));
        assert_eq!(t.position(), (0.6, 0.5));
    }

    #[test]
    fn test_follows_same_subject() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.5, 0.8)), 0.0, 3000.0);
        // 0.505 is ~9.6 px of horizontal movement, under the threshold.
        let event = t.update(Some(&subject(0, 0.505, 0.9)), 0.0, 3000.0);
        assert_eq!(event, TrackerEvent::Following { id: 0 });
        assert_eq!(t.position().0, 0.505);
    }

    #[test]
    fn test_displacement_switches_immediately() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.5, 0.8)), 0.0, 3000.0);
        // 0.1 of normalized x is 192 px, far past the threshold.
        let event = t.update(Some(&subject(1, 0.6, 0.2)), 0.0, 3000.0);
        assert_eq!(event, TrackerEvent::DisplacementSwitch { id: 1 });
        assert_eq!(t.current_id(), Some(1));
    }

    #[test]
    fn test_weak_rival_does_not_contest() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.5, 0.8)), 0.0, 3000.0);
        // Within the margin: 0.9 <= 0.8 + 0.15.
        let event = t.update(Some(&subject(1, 0.505, 0.9)), 0.0, 3000.0);
        assert_eq!(event, TrackerEvent::WeakRival { current: 0 });
        assert_eq!(t.current_id(), Some(0));
        // The rival's position is still followed.
        assert_eq!(t.position().0, 0.505);
    }

    #[test]
    fn test_strong_rival_commits_after_buffer() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.5, 0.5)), 0.0, 3000.0);

        let rival = subject(1, 0.51, 0.8);
        for frame in 1..30 {
            let event = t.update(Some(&rival), 0.0, 3000.0);
            assert_eq!(
                event,
                TrackerEvent::RivalPending {
                    id: 1,
                    frames: frame,
                    required: 30
                }
            );
            assert_eq!(t.current_id(), Some(0), "no switch before the buffer fills");
        }

        // The 30th consecutive confirming frame commits the switch.
        let event = t.update(Some(&rival), 0.0, 3000.0);
        assert_eq!(event, TrackerEvent::Switched { id: 1 });
        assert_eq!(t.current_id(), Some(1));
    }

    #[test]
    fn test_pending_buffer_restarts_on_interruption() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.5, 0.5)), 0.0, 3000.0);

        let rival = subject(1, 0.51, 0.8);
        for _ in 0..10 {
            t.update(Some(&rival), 0.0, 3000.0);
        }
        // The original subject reappearing clears the pending rival.
        t.update(Some(&subject(0, 0.505, 0.5)), 0.0, 3000.0);

        let event = t.update(Some(&rival), 0.0, 3000.0);
        assert_eq!(
            event,
            TrackerEvent::RivalPending {
                id: 1,
                frames: 1,
                required: 30
            }
        );
    }

    #[test]
    fn test_lock_suppresses_further_switching() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.5, 0.5)), 0.0, 3000.0);
        let rival = subject(1, 0.51, 0.8);
        for _ in 0..30 {
            t.update(Some(&rival), 0.0, 3000.0);
        }
        assert_eq!(t.current_id(), Some(1));

        // A new strong rival arrives right after the switch; the lock holds
        // for exactly 45 frames.
        let next = subject(2, 0.515, 0.99);
        for _ in 0..45 {
            let event = t.update(Some(&next), 0.0, 3000.0);
            assert_eq!(event, TrackerEvent::LockHeld { current: 1 });
        }
        let event = t.update(Some(&next), 0.0, 3000.0);
        assert_eq!(
            event,
            TrackerEvent::RivalPending {
                id: 2,
                frames: 1,
                required: 30
            }
        );
    }

    #[test]
    fn test_no_detection_holds_then_resets() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.7, 0.8)), 0.0, 3000.0);

        for lost in 1..30 {
            let event = t.update(None, 0.0, 3000.0);
            assert_eq!(event, TrackerEvent::Holding { lost, limit: 30 });
            assert_eq!(t.position().0, 0.7, "position held while buffering");
        }

        let event = t.update(None, 0.0, 3000.0);
        assert_eq!(event, TrackerEvent::LostReset);
        assert_eq!(t.current_id(), None);
        assert_eq!(t.position(), (0.5, 0.5));
    }

    #[test]
    fn test_detection_resets_lost_counter() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.7, 0.8)), 0.0, 3000.0);

        for _ in 0..20 {
            t.update(None, 0.0, 3000.0);
        }
        t.update(Some(&subject(0, 0.7, 0.8)), 0.0, 3000.0);

        // A fresh run of misses starts from zero.
        for lost in 1..30 {
            let event = t.update(None, 0.0, 3000.0);
            assert_eq!(event, TrackerEvent::Holding { lost, limit: 30 });
        }
    }

    #[test]
    fn test_scene_cut_resets_to_center() {
        let mut t = tracker();
        t.update(Some(&subject(0, 0.8, 0.9)), 0.0, 3000.0);

        let event = t.update(Some(&subject(0, 0.8, 0.9)), 5000.0, 3000.0);
        assert_eq!(event, TrackerEvent::SceneReset);
        assert_eq!(t.current_id(), None);
        assert_eq!(t.position(), (0.5, 0.5));
    }

    #[test]
    fn test_event_display_strings() {
        assert_eq!(
            TrackerEvent::RivalPending {
                id: 3,
                frames: 1,
                required: 30
            }
            .to_string(),
            "Candidate switch to subject 3 started. (1/30)"
        );
        assert_eq!(
            TrackerEvent::Holding { lost: 4, limit: 30 }.to_string(),
            "No detection; holding last position (4/30)."
        );
        assert_eq!(
            TrackerEvent::Switched { id: 2 }.to_string(),
            "Switched to subject 2. Lock initiated."
        );
    }
}
