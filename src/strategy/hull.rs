//! Corridor tracking with two convex hulls.
//!
//! The upper chain holds the `y + epsilon` points and the lower chain the
//! `y - epsilon` points. Together with the feasible window `[ymin, ymax]` at
//! the frontier they describe every line that stays within the bound, so a
//! segment only ends when no single line can cover the next point.
//!
//! The first vertex of each chain is kept at the segment's start time and
//! re-projected whenever the chain is cut, so the line through that vertex
//! and the window bound at the frontier is always an extreme feasible line.

use std::iter;

use crate::geometry::{coefficients, y_at, Line};
use crate::point::Point;

use super::{CandidateSegment, FitStrategy};

/// Maximal single-pass strategy: keeps the full set of feasible lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvexHullStrategy;

/// One monotone chain of epsilon-shifted points.
///
/// `sign` is `+1` for the upper chain and `-1` for the lower one, which makes
/// the edge projections at any later time ascending for both.
#[derive(Debug, Clone)]
struct Chain {
    sign: f64,
    points: Vec<Point>,
}

impl Chain {
    fn new(p0: Point, p1: Point, offset: f64, sign: f64) -> Self {
        Self {
            sign,
            points: vec![p0.shifted(offset), p1.shifted(offset)],
        }
    }

    #[inline]
    fn first(&self) -> Point {
        self.points[0]
    }

    /// Signed value at `x` of the edge starting at vertex `i`
    #[inline]
    fn projected(&self, i: usize, x: f64) -> f64 {
        self.sign * y_at(x, self.points[i], self.points[i + 1])
    }

    /// First edge whose projection at `p.x` is not below `p.y` (signed).
    fn index(&self, p: Point) -> usize {
        let target = self.sign * p.y;
        let (mut lo, mut hi) = (0, self.points.len() - 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.projected(mid, p.x) < target {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Cut the vertices before the tangent from `p`, re-projecting the start.
    fn update_head(&mut self, p: Point) {
        let i = self.index(p);
        if i != 0 {
            let x0 = self.points[0].x;
            let y0 = y_at(x0, self.points[i], p);
            self.points.splice(..i, iter::once(Point::new(x0, y0)));
        }
    }

    /// Append `p`, dropping the vertices it makes non-convex.
    fn update_tail(&mut self, p: Point) {
        let i = self.index(p);
        self.points.truncate(i + 1);
        self.points.push(p);
    }
}

/// Candidate segment of [`ConvexHullStrategy`]
#[derive(Debug, Clone)]
pub struct ConvexHullSegment {
    epsilon: f64,
    /// Frontier time
    t: f64,
    ymin: f64,
    ymax: f64,
    /// Window bounds at the last checked point, committed by `update`
    next_ymin: f64,
    next_ymax: f64,
    lower: Chain,
    upper: Chain,
}

impl FitStrategy for ConvexHullStrategy {
    type Segment = ConvexHullSegment;

    fn initialize(&self, p0: Point, p1: Point, epsilon: f64) -> ConvexHullSegment {
        ConvexHullSegment {
            epsilon,
            t: p1.x,
            ymin: p1.y - epsilon,
            ymax: p1.y + epsilon,
            next_ymin: p1.y - epsilon,
            next_ymax: p1.y + epsilon,
            lower: Chain::new(p0, p1, -epsilon, -1.0),
            upper: Chain::new(p0, p1, epsilon, 1.0),
        }
    }
}

#[cfg(test)]
impl ConvexHullSegment {
    /// Number of vertices held by both chains
    fn hull_len(&self) -> usize {
        self.lower.points.len() + self.upper.points.len()
    }
}

impl CandidateSegment for ConvexHullSegment {
    fn check(&mut self, p: Point) -> bool {
        self.next_ymin = y_at(p.x, self.upper.first(), Point::new(self.t, self.ymin));
        self.next_ymax = y_at(p.x, self.lower.first(), Point::new(self.t, self.ymax));
        !(p.y - self.epsilon > self.next_ymax || p.y + self.epsilon < self.next_ymin)
    }

    fn update(&mut self, p: Point) {
        self.ymin = self.next_ymin;
        self.ymax = self.next_ymax;
        self.t = p.x;

        let low = p.y - self.epsilon;
        let high = p.y + self.epsilon;

        if low > self.ymin {
            self.ymin = low;
            self.upper.update_head(Point::new(p.x, low));
        }
        if high < self.ymax {
            self.ymax = high;
            self.lower.update_head(Point::new(p.x, high));
        }

        self.lower.update_tail(Point::new(p.x, low));
        self.upper.update_tail(Point::new(p.x, high));
    }

    fn flush(self) -> Line {
        let start = self.lower.first();
        let y_start = (start.y + self.upper.first().y) / 2.0;
        let y_end = (self.ymin + self.ymax) / 2.0;
        coefficients(Point::new(start.x, y_start), Point::new(self.t, y_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(seg: &mut ConvexHullSegment, points: &[(f64, f64)]) -> usize {
        let mut accepted = 0;
        for &(x, y) in points {
            let p = Point::new(x, y);
            if !seg.check(p) {
                break;
            }
            seg.update(p);
            accepted += 1;
        }
        accepted
    }

    #[test]
    fn test_exact_line_zero_epsilon() {
        let mut seg =
            ConvexHullStrategy.initialize(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 0.0);
        assert_eq!(feed(&mut seg, &[(2.0, 2.0), (3.0, 3.0)]), 2);
        assert_eq!(seg.flush(), Line::new(1.0, 0.0));
    }

    #[test]
    fn test_zigzag_within_band_is_accepted() {
        let mut seg =
            ConvexHullStrategy.initialize(Point::new(0.0, 0.0), Point::new(1.0, 0.8), 0.5);
        let zigzag = [(2.0, 0.0), (3.0, 0.8), (4.0, 0.0), (5.0, 0.8), (6.0, 0.0)];
        assert_eq!(feed(&mut seg, &zigzag), zigzag.len());
        let line = seg.flush();
        for (x, y) in [(0.0, 0.0), (1.0, 0.8)].iter().chain(zigzag.iter()) {
            assert!((line.at(*x) - y).abs() <= 0.5 + 1e-9, "x={x}");
        }
    }

    #[test]
    fn test_rejects_point_no_line_can_reach() {
        let mut seg =
            ConvexHullStrategy.initialize(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 0.5);
        assert_eq!(feed(&mut seg, &[(2.0, 0.0), (3.0, 5.0)]), 1);
    }

    #[test]
    fn test_chains_stay_bounded_on_straight_input() {
        let mut seg =
            ConvexHullStrategy.initialize(Point::new(0.0, 0.0), Point::new(1.0, 2.0), 1.0);
        let points: Vec<(f64, f64)> = (2..200).map(|i| (f64::from(i), 2.0 * f64::from(i))).collect();
        assert_eq!(feed(&mut seg, &points), points.len());
        assert!(seg.hull_len() <= 8, "hull grew to {}", seg.hull_len());
    }
}
