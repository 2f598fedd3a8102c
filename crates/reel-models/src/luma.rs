//! Luminance frames consumed by scene-cut differencing.

use serde::{Deserialize, Serialize};

/// A decoded frame's luminance plane.
///
/// Produced by the external decoder; the reframing core only reads it to
/// compute the frame-to-frame difference signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumaFrame {
    /// Plane width in pixels
    pub width: u32,
    /// Plane height in pixels
    pub height: u32,
    /// Row-major 8-bit luminance samples, `width * height` long
    pub data: Vec<u8>,
}

impl LumaFrame {
    /// Create a new luminance frame.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Create a frame filled with a single luminance value.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; (width as usize) * (height as usize)],
        }
    }

    /// Whether the sample buffer matches the declared dimensions.
    pub fn shape_ok(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize)
    }

    /// Whether two frames have identical dimensions.
    #[inline]
    pub fn same_shape(&self, other: &LumaFrame) -> bool {
        self.width == other.width && self.height == other.height
    }
}
