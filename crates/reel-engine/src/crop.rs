//! Crop window geometry.
//!
//! Maps a normalized horizontal center to a clamped, full-height pixel crop
//! window. The offline planner and the online tracker both go through
//! [`map_crop_window`] so the two pipelines frame identically.

use reel_models::VideoMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target aspect ratio for the output crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AspectRatio {
    /// Width component
    pub width: u32,
    /// Height component
    pub height: u32,
}

impl AspectRatio {
    /// Create a new aspect ratio.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns width/height as float.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Portrait 9:16 (Shorts, Reels)
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// A full-height vertical crop window in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    /// Left edge x-coordinate
    pub x: i32,
    /// Crop width
    pub width: i32,
    /// Crop height (the full source height)
    pub height: i32,
}

impl CropWindow {
    /// Create a new crop window.
    pub fn new(x: i32, width: i32, height: i32) -> Self {
        Self { x, width, height }
    }

    /// Right edge x-coordinate (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }
}

/// Map a normalized horizontal center to a crop window.
///
/// The crop width derives from the full source height and the target
/// aspect ratio. If that width exceeds the source width the geometry is
/// degenerate and the width is clamped rather than signaled; the window is
/// then shifted so it stays fully inside the frame.
pub fn map_crop_window(center: f64, metadata: &VideoMetadata, aspect: AspectRatio) -> CropWindow {
    let source_width = metadata.width as i32;

    let crop_width = (metadata.height as f64 * aspect.ratio()).round() as i32;
    let crop_width = crop_width.min(source_width);

    let x_center = (center * metadata.width as f64).round() as i32;
    let x = (x_center - crop_width / 2).clamp(0, source_width - crop_width);

    CropWindow::new(x, crop_width, metadata.height as i32)
}
