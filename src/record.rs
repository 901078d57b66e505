//! Records emitted by the wire protocols and their reconstructions.

use serde::{Deserialize, Serialize};

use crate::geometry::Line;
use crate::point::Point;

/// A segment that carries its own start time (TwoStream only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchoredSegment {
    /// Time of the first covered point
    pub start_x: f64,
    /// Number of covered points
    pub n: usize,
    pub line: Line,
}

/// One self-describing unit of compressed output.
///
/// | Variant | Protocols | Wire tuple |
/// |---------|-----------|------------|
/// | `Run` | TwoStream | `(L, (x0, n, a, b) \| none)` |
/// | `Singleton` | SingleStream, Lidar | `(1, y)` |
/// | `Segment` | SingleStream, Lidar, Variant | `(n, a, b)` |
/// | `Flat` | Lidar | `(-n, b)` |
/// | `Batch` | Variant | `(-m, y0, .., ym-1)` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// Loose values followed by an optional segment
    Run {
        values: Vec<f64>,
        segment: Option<AnchoredSegment>,
    },
    /// One unapproximated value
    Singleton(f64),
    /// `n` points on `line`
    Segment { n: usize, line: Line },
    /// `n` points on the horizontal line `y = b`
    Flat { n: usize, b: f64 },
    /// Consecutive unapproximated values
    Batch(Vec<f64>),
}

impl Record {
    /// Number of input points this record accounts for
    #[must_use]
    pub fn point_count(&self) -> usize {
        match self {
            Self::Run { values, segment } => values.len() + segment.map_or(0, |s| s.n),
            Self::Singleton(_) => 1,
            Self::Segment { n, .. } | Self::Flat { n, .. } => *n,
            Self::Batch(values) => values.len(),
        }
    }

    /// Signed counter leading the record on the wire.
    ///
    /// For `Run` records this is the number of loose values.
    #[must_use]
    pub fn counter(&self) -> i64 {
        let signed = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        match self {
            Self::Run { values, .. } => signed(values.len()),
            Self::Singleton(_) => 1,
            Self::Segment { n, .. } => signed(*n),
            Self::Flat { n, .. } => -signed(*n),
            Self::Batch(values) => -signed(values.len()),
        }
    }

    /// Whether the record approximates points with a line
    #[must_use]
    pub fn is_segment(&self) -> bool {
        match self {
            Self::Run { segment, .. } => segment.is_some(),
            Self::Segment { .. } | Self::Flat { .. } => true,
            Self::Singleton(_) | Self::Batch(_) => false,
        }
    }
}

/// Points rebuilt from one record, with the record's storage cost
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconstruction {
    pub points: Vec<Point>,
    /// Record size in input-value equivalents
    pub cost: f64,
}

impl Reconstruction {
    /// Append another reconstruction (used when several records resolve at once)
    pub fn merge(&mut self, other: Reconstruction) {
        self.points.extend(other.points);
        self.cost += other.cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_follow_wire_signs() {
        assert_eq!(Record::Singleton(1.0).counter(), 1);
        assert_eq!(Record::Flat { n: 4, b: 0.0 }.counter(), -4);
        assert_eq!(Record::Batch(vec![1.0, 2.0]).counter(), -2);
        let run = Record::Run {
            values: vec![1.0],
            segment: Some(AnchoredSegment {
                start_x: 1.0,
                n: 3,
                line: Line::new(0.0, 0.0),
            }),
        };
        assert_eq!(run.counter(), 1);
        assert_eq!(run.point_count(), 4);
        assert!(run.is_segment());
        assert!(!Record::Batch(vec![]).is_segment());
    }
}
