//! Time-source adaptors used to pair records with timestamps.

use crate::constants::TIMESTAMP_DELTA;
use crate::point::Point;

/// Points whose timestamps are forced strictly increasing.
///
/// Returned by [`approximate_timestamps`].
#[derive(Debug, Clone)]
pub struct ApproximateTimestamps<I> {
    inner: I,
    last: Option<f64>,
}

impl<I: Iterator<Item = Point>> Iterator for ApproximateTimestamps<I> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let mut p = self.inner.next()?;
        if let Some(last) = self.last {
            if p.x <= last {
                p.x = last + TIMESTAMP_DELTA;
            }
        }
        self.last = Some(p.x);
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Nudge every non-increasing timestamp to just after the previous emitted one.
///
/// The nudge is applied to the previous *emitted* timestamp, so a run of
/// equal timestamps becomes `t, t + d, t + 2d, ...`.
pub fn approximate_timestamps<I>(points: I) -> ApproximateTimestamps<I::IntoIter>
where
    I: IntoIterator<Item = Point>,
{
    ApproximateTimestamps {
        inner: points.into_iter(),
        last: None,
    }
}

/// Number values by position: `(1, y0), (2, y1), ...`
pub fn logical_times<I>(values: I) -> impl Iterator<Item = Point>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(i, y)| Point::new((i + 1) as f64, y))
}

/// Project the time component of each point, for use as a reconstruction time source
pub fn timestamps<I>(points: I) -> impl Iterator<Item = f64>
where
    I: IntoIterator<Item = Point>,
{
    points.into_iter().map(|p| p.x)
}
