//! Line-fitting strategies.
//!
//! A strategy decides, point by point, whether a growing candidate segment
//! can still be covered by one line within the error bound. Every strategy
//! works in a single forward pass: a point rejected by
//! [`CandidateSegment::check`] is never handed to
//! [`CandidateSegment::update`], and earlier points are never revisited.
//!
//! | Strategy | State | Per point | Maximal |
//! |----------|-------|-----------|---------|
//! | [`AngleStrategy`] | slope interval around an apex | O(1) | no |
//! | [`ConvexHullStrategy`] | two hull chains + frontier window | O(log n) amortized | yes |
//! | [`LinearRegressionStrategy`] | running sums + two envelopes | O(n) | no |

mod angle;
mod hull;
mod regression;

pub use angle::{AngleSegment, AngleStrategy};
pub use hull::{ConvexHullSegment, ConvexHullStrategy};
pub use regression::{LinearRegressionSegment, LinearRegressionStrategy};

use crate::geometry::Line;
use crate::point::Point;

/// Factory for candidate segments.
///
/// Strategies carry no per-segment state themselves; every call to
/// [`initialize`](FitStrategy::initialize) starts a fresh candidate that is
/// owned by the protocol until it is flushed or abandoned.
pub trait FitStrategy {
    /// Per-segment state
    type Segment: CandidateSegment;

    /// Start a candidate segment anchored at two consecutive points.
    ///
    /// `p1.x` must be strictly greater than `p0.x`.
    fn initialize(&self, p0: Point, p1: Point, epsilon: f64) -> Self::Segment;
}

/// A segment under construction.
pub trait CandidateSegment {
    /// Whether `p` can join the segment without breaking the error bound.
    ///
    /// Returning `false` ends the segment attempt; `p` then seeds the next one.
    fn check(&mut self, p: Point) -> bool;

    /// Accept `p`. Must follow a successful [`check`](Self::check) of the same point.
    fn update(&mut self, p: Point);

    /// Finalize the segment's line.
    fn flush(self) -> Line;
}
