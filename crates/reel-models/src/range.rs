//! Frame ranges for multi-crop runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a `"start-end"` frame range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeParseError {
    #[error("frame range must use 'start-end' form, got '{0}'")]
    Malformed(String),

    #[error("invalid frame number '{0}'")]
    InvalidNumber(String),

    #[error("frame range start {start} is after end {end}")]
    Inverted { start: u64, end: u64 },
}

/// A half-open range of frame indices `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    /// First frame index (inclusive)
    pub start: u64,
    /// End frame index (exclusive)
    pub end: u64,
}

impl FrameRange {
    /// Create a new frame range.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Clamp the range to `[0, frame_count]`.
    ///
    /// Out-of-range requests are narrowed, never rejected; a range entirely
    /// past the end collapses to empty at `frame_count`.
    pub fn clamp_to(&self, frame_count: u64) -> FrameRange {
        let end = self.end.min(frame_count);
        FrameRange {
            start: self.start.min(end),
            end,
        }
    }

    /// Number of frames covered.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the range covers no frames.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl FromStr for FrameRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| RangeParseError::Malformed(s.to_string()))?;

        let start: u64 = start
            .trim()
            .parse()
            .map_err(|_| RangeParseError::InvalidNumber(start.trim().to_string()))?;
        let end: u64 = end
            .trim()
            .parse()
            .map_err(|_| RangeParseError::InvalidNumber(end.trim().to_string()))?;

        if start > end {
            return Err(RangeParseError::Inverted { start, end });
        }

        Ok(FrameRange { start, end })
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
