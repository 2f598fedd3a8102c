//! Detection aggregation: keypoints to subject clusters.
//!
//! Groups raw per-keypoint detections that fall within a small normalized
//! radius into clusters approximating one person each. Clustering is greedy
//! and single-pass: each detection joins the first cluster whose running
//! centroid is close enough, in insertion order, with no refinement.

use reel_models::KeypointDetection;
use serde::{Deserialize, Serialize};

/// A merged group of nearby keypoint detections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectCluster {
    /// Index within the current frame's cluster list; positional, not a
    /// persistent identity across frames
    pub id: usize,
    /// Mean horizontal position of merged detections (normalized)
    pub x: f64,
    /// Mean vertical position of merged detections (normalized)
    pub y: f64,
    /// Maximum confidence among merged detections
    pub confidence: f64,
}

/// Running cluster state during aggregation.
#[derive(Debug)]
struct Accumulator {
    sum_x: f64,
    sum_y: f64,
    count: usize,
    max_confidence: f64,
}

impl Accumulator {
    fn seed(det: &KeypointDetection) -> Self {
        Self {
            sum_x: det.x,
            sum_y: det.y,
            count: 1,
            max_confidence: det.confidence,
        }
    }

    #[inline]
    fn centroid(&self) -> (f64, f64) {
        (
            self.sum_x / self.count as f64,
            self.sum_y / self.count as f64,
        )
    }

    fn merge(&mut self, det: &KeypointDetection) {
        self.sum_x += det.x;
        self.sum_y += det.y;
        self.count += 1;
        if det.confidence > self.max_confidence {
            self.max_confidence = det.confidence;
        }
    }
}

/// Merge detections that lie within `radius` of a cluster's running
/// centroid, in normalized (x, y) space.
///
/// O(n * k) for n detections and k clusters; n is bounded by the pose
/// model's keypoint count. An empty input yields an empty output.
pub fn aggregate(detections: &[KeypointDetection], radius: f64) -> Vec<SubjectCluster> {
    let mut accumulators: Vec<Accumulator> = Vec::new();

    for det in detections {
        let mut merged = false;
        for acc in &mut accumulators {
            let (cx, cy) = acc.centroid();
            let distance = ((det.x - cx).powi(2) + (det.y - cy).powi(2)).sqrt();
            if distance < radius {
                acc.merge(det);
                merged = true;
                break;
            }
        }
        if !merged {
            accumulators.push(Accumulator::seed(det));
        }
    }

    accumulators
        .iter()
        .enumerate()
        .map(|(id, acc)| {
            let (x, y) = acc.centroid();
            SubjectCluster {
                id,
                x,
                y,
                confidence: acc.max_confidence,
            }
        })
        .collect()
}

/// Drop detections at or below `threshold`, then aggregate the rest.
pub fn aggregate_confident(
    detections: &[KeypointDetection],
    threshold: f64,
    radius: f64,
) -> Vec<SubjectCluster> {
    let confident: Vec<KeypointDetection> = detections
        .iter()
        .filter(|d| d.is_confident(threshold))
        .copied()
        .collect();
    aggregate(&confident, radius)
}

/// The single highest-confidence cluster, if any.
///
/// Ties keep the earliest cluster, matching insertion order.
pub fn primary(clusters: &[SubjectCluster]) -> Option<&SubjectCluster> {
    clusters
        .iter()
        .reduce(|best, c| if c.confidence > best.confidence { c } else { best })
}
