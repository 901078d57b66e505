//! Incremental least-squares fit validated against two envelopes.

use crate::constants::REGRESSION_TOLERANCE;
use crate::geometry::{coefficients, y_at, Line};
use crate::point::Point;

use super::{CandidateSegment, FitStrategy};

/// Refits the least-squares line on every point and keeps it while it stays
/// within the bound of every accepted point.
///
/// Only points on the upper and lower envelopes are re-checked, and they are
/// scanned linearly (see [`envelopes_admit`]). The best-fit line is not the
/// only feasible one, so segments may end earlier than with
/// [`ConvexHullStrategy`](super::ConvexHullStrategy).
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegressionStrategy;

#[derive(Debug, Clone, Copy, Default)]
struct Sums {
    n: f64,
    x: f64,
    y: f64,
    x2: f64,
    xy: f64,
}

impl Sums {
    fn with(mut self, p: Point) -> Self {
        self.n += 1.0;
        self.x += p.x;
        self.y += p.y;
        self.x2 += p.x * p.x;
        self.xy += p.x * p.y;
        self
    }

    fn best_fit(&self) -> Line {
        let a = (self.n * self.xy - self.x * self.y) / (self.n * self.x2 - self.x * self.x);
        Line::new(a, (self.y - a * self.x) / self.n)
    }
}

/// Candidate segment of [`LinearRegressionStrategy`]
#[derive(Debug, Clone)]
pub struct LinearRegressionSegment {
    epsilon: f64,
    sums: Sums,
    line: Line,
    /// Vertices of the `y + epsilon` envelope
    upper: Vec<Point>,
    /// Vertices of the `y - epsilon` envelope
    lower: Vec<Point>,
    /// Sums and line including the last checked point
    proposal: Option<(Sums, Line)>,
}

impl FitStrategy for LinearRegressionStrategy {
    type Segment = LinearRegressionSegment;

    fn initialize(&self, p0: Point, p1: Point, epsilon: f64) -> LinearRegressionSegment {
        LinearRegressionSegment {
            epsilon,
            sums: Sums::default().with(p0).with(p1),
            line: coefficients(p0, p1),
            upper: vec![p0.shifted(epsilon), p1.shifted(epsilon)],
            lower: vec![p0.shifted(-epsilon), p1.shifted(-epsilon)],
            proposal: None,
        }
    }
}

/// Whether `line` passes below every upper vertex and above every lower one.
///
/// A plain scan over both envelopes. It only checks the envelope vertices,
/// which is what decides which segments get accepted; replacing it with a
/// hull search would accept different segments.
#[must_use]
pub fn envelopes_admit(line: Line, upper: &[Point], lower: &[Point]) -> bool {
    upper.iter().all(|p| line.at(p.x) <= p.y + REGRESSION_TOLERANCE)
        && lower.iter().all(|p| line.at(p.x) >= p.y - REGRESSION_TOLERANCE)
}

/// Push `p`, popping vertices while the last edge extended to `p.x` is on the wrong side
fn push_envelope(envelope: &mut Vec<Point>, p: Point, beyond: impl Fn(f64, f64) -> bool) {
    while envelope.len() > 2 {
        let n = envelope.len();
        if !beyond(y_at(p.x, envelope[n - 2], envelope[n - 1]), p.y) {
            break;
        }
        envelope.pop();
    }
    envelope.push(p);
}

impl CandidateSegment for LinearRegressionSegment {
    fn check(&mut self, p: Point) -> bool {
        let sums = self.sums.with(p);
        let line = sums.best_fit();

        let fitted = line.at(p.x);
        let slack = self.epsilon + REGRESSION_TOLERANCE;
        if !(p.y - slack <= fitted && fitted <= p.y + slack) {
            return false;
        }
        if !envelopes_admit(line, &self.upper, &self.lower) {
            return false;
        }

        self.proposal = Some((sums, line));
        true
    }

    fn update(&mut self, p: Point) {
        let (sums, line) = match self.proposal.take() {
            Some(proposal) => proposal,
            None => {
                let sums = self.sums.with(p);
                (sums, sums.best_fit())
            }
        };
        self.sums = sums;
        self.line = line;

        push_envelope(&mut self.upper, p.shifted(self.epsilon), |edge, y| edge > y);
        push_envelope(&mut self.lower, p.shifted(-self.epsilon), |edge, y| edge < y);
    }

    fn flush(self) -> Line {
        self.line
    }
}
