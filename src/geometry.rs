//! 2D line utilities shared by the fit strategies.

use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Line `y = a * x + b`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    /// Slope
    pub a: f64,
    /// Intercept
    pub b: f64,
}

impl Line {
    #[inline]
    #[must_use]
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Evaluate the line at `x`
    #[inline]
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.a * x + self.b
    }
}

/// Line through two points with distinct x coordinates.
#[inline]
#[must_use]
pub fn coefficients(p: Point, q: Point) -> Line {
    let dx = q.x - p.x;
    Line {
        a: (q.y - p.y) / dx,
        b: (q.x * p.y - q.y * p.x) / dx,
    }
}

/// Value at `x` of the line through `p` and `q`.
///
/// Cheaper than building the [`Line`] when only one evaluation is needed.
#[inline]
#[must_use]
pub fn y_at(x: f64, p: Point, q: Point) -> f64 {
    ((q.y - p.y) * x + q.x * p.y - q.y * p.x) / (q.x - p.x)
}

/// Intersection of line (p1, p2) with line (p3, p4).
///
/// Returns `None` when the lines are parallel (including coincident).
#[must_use]
pub fn intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let d = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if d == 0.0 {
        return None;
    }
    let d1 = p1.x * p2.y - p1.y * p2.x;
    let d2 = p3.x * p4.y - p3.y * p4.x;
    Some(Point {
        x: (d1 * (p3.x - p4.x) - (p1.x - p2.x) * d2) / d,
        y: (d1 * (p3.y - p4.y) - (p1.y - p2.y) * d2) / d,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coefficients_through_two_points() {
        let line = coefficients(Point::new(1.0, 3.0), Point::new(3.0, 7.0));
        assert_eq!(line, Line::new(2.0, 1.0));
        assert_eq!(line.at(10.0), 21.0);
    }

    #[test]
    fn test_y_at_matches_coefficients() {
        let p = Point::new(-2.0, 5.0);
        let q = Point::new(4.0, -1.0);
        let line = coefficients(p, q);
        for x in [-3.0, 0.0, 1.5, 8.0] {
            assert!((y_at(x, p, q) - line.at(x)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_intersection_of_crossing_lines() {
        let i = intersection(
            Point::new(0.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(2.0, 0.0),
        )
        .unwrap();
        assert!((i.x - 1.0).abs() < 1e-12);
        assert!((i.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_intersection_parallel_is_none() {
        let p = Point::new(0.0, 0.0);
        let q = Point::new(1.0, 1.0);
        assert_eq!(intersection(p, q, p, q), None);
        assert_eq!(
            intersection(p, q, Point::new(0.0, 1.0), Point::new(1.0, 2.0)),
            None
        );
    }
}
