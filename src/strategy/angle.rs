//! Slope-interval tracking around an apex.

use crate::geometry::{intersection, Line};
use crate::point::Point;

use super::{CandidateSegment, FitStrategy};

/// Keeps the range of feasible slopes through a fixed apex.
///
/// The apex is where the two extreme lines through the epsilon-shifted first
/// two points cross. Cheap, but the apex constraint makes it conservative.
#[derive(Debug, Clone, Copy, Default)]
pub struct AngleStrategy;

/// Candidate segment of [`AngleStrategy`]
#[derive(Debug, Clone)]
pub struct AngleSegment {
    apex: Point,
    epsilon: f64,
    amin: f64,
    amax: f64,
}

impl FitStrategy for AngleStrategy {
    type Segment = AngleSegment;

    fn initialize(&self, p0: Point, p1: Point, epsilon: f64) -> AngleSegment {
        // With a zero bound both extreme lines coincide and p0 is on every feasible line
        let apex = intersection(
            p0.shifted(-epsilon),
            p1.shifted(epsilon),
            p0.shifted(epsilon),
            p1.shifted(-epsilon),
        )
        .unwrap_or(p0);

        let mut segment = AngleSegment {
            apex,
            epsilon,
            amin: 0.0,
            amax: 0.0,
        };
        segment.amin = segment.slope_to(p1.shifted(-epsilon));
        segment.amax = segment.slope_to(p1.shifted(epsilon));
        segment
    }
}

impl AngleSegment {
    #[inline]
    fn slope_to(&self, p: Point) -> f64 {
        (p.y - self.apex.y) / (p.x - self.apex.x)
    }

    #[inline]
    fn through_apex(&self, slope: f64, x: f64) -> f64 {
        slope * (x - self.apex.x) + self.apex.y
    }
}

impl CandidateSegment for AngleSegment {
    fn check(&mut self, p: Point) -> bool {
        let too_high = self.through_apex(self.amin, p.x) > p.y + self.epsilon;
        let too_low = self.through_apex(self.amax, p.x) < p.y - self.epsilon;
        !(too_high || too_low)
    }

    fn update(&mut self, p: Point) {
        self.amin = self.amin.max(self.slope_to(p.shifted(-self.epsilon)));
        self.amax = self.amax.min(self.slope_to(p.shifted(self.epsilon)));
    }

    fn flush(self) -> Line {
        let a = (self.amin + self.amax) / 2.0;
        Line::new(a, self.apex.y - a * self.apex.x)
    }
}
