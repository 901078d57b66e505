//! Point struct for input and reconstructed streams.

use serde::{Deserialize, Serialize};

/// A (time, value) sample
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Time coordinate (non-decreasing along a stream)
    pub x: f64,
    /// Sampled value
    pub y: f64,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same time, value shifted by `dy`
    #[inline]
    #[must_use]
    pub fn shifted(self, dy: f64) -> Self {
        Self { x: self.x, y: self.y + dy }
    }
}

impl From<(f64, f64)> for Point {
    #[inline]
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}
