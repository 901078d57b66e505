//! SingleStream protocol, its lidar rewrite, and the 2-point fitting loop
//! shared with the variant protocol.

use std::collections::VecDeque;
use std::mem;

use crate::geometry::Line;
use crate::point::Point;
use crate::record::Record;
use crate::strategy::{CandidateSegment, FitStrategy};

/// Outcome of the shared fitting loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Fitted {
    /// A point that could not start a segment longer than 2
    Isolated(f64),
    /// A finished segment of `n` points
    Segment { n: usize, line: Line },
}

enum Lookahead<C> {
    Empty,
    One(Point),
    Fitting {
        p0: Point,
        p1: Point,
        n: usize,
        candidate: C,
    },
}

/// Drives one strategy over a 2-point lookahead
pub(crate) struct Fitter<S: FitStrategy> {
    strategy: S,
    epsilon: f64,
    max_n: usize,
    singletons: bool,
    state: Lookahead<S::Segment>,
}

impl<S: FitStrategy> Fitter<S> {
    pub(crate) fn new(strategy: S, epsilon: f64, max_n: usize, singletons: bool) -> Self {
        Self {
            strategy,
            epsilon,
            max_n,
            singletons,
            state: Lookahead::Empty,
        }
    }

    #[inline]
    fn start(&self, p0: Point, p1: Point) -> Lookahead<S::Segment> {
        Lookahead::Fitting {
            p0,
            p1,
            n: 2,
            candidate: self.strategy.initialize(p0, p1, self.epsilon),
        }
    }

    pub(crate) fn step(&mut self, p: Point, mut emit: impl FnMut(Fitted)) {
        self.state = match mem::replace(&mut self.state, Lookahead::Empty) {
            Lookahead::Empty => Lookahead::One(p),
            Lookahead::One(p0) => self.start(p0, p),
            Lookahead::Fitting {
                p0,
                p1,
                n,
                mut candidate,
            } => {
                if n < self.max_n && candidate.check(p) {
                    candidate.update(p);
                    Lookahead::Fitting {
                        p0,
                        p1,
                        n: n + 1,
                        candidate,
                    }
                } else if self.singletons && n == 2 {
                    emit(Fitted::Isolated(p0.y));
                    self.start(p1, p)
                } else {
                    emit(Fitted::Segment {
                        n,
                        line: candidate.flush(),
                    });
                    Lookahead::One(p)
                }
            }
        };
    }

    pub(crate) fn finish(&mut self, mut emit: impl FnMut(Fitted)) {
        match mem::replace(&mut self.state, Lookahead::Empty) {
            Lookahead::Empty => {}
            Lookahead::One(p0) => emit(Fitted::Isolated(p0.y)),
            Lookahead::Fitting { p0, p1, n: 2, .. } if self.singletons => {
                emit(Fitted::Isolated(p0.y));
                emit(Fitted::Isolated(p1.y));
            }
            Lookahead::Fitting { n, candidate, .. } => emit(Fitted::Segment {
                n,
                line: candidate.flush(),
            }),
        }
    }
}

impl Fitted {
    pub(crate) fn into_record(self) -> Record {
        match self {
            Self::Isolated(y) => Record::Singleton(y),
            Self::Segment { n, line } => Record::Segment { n, line },
        }
    }
}

/// `(1, y)` singletons and `(n, a, b)` segments
pub struct SingleStream<S: FitStrategy> {
    fitter: Fitter<S>,
}

impl<S: FitStrategy> SingleStream<S> {
    #[must_use]
    pub fn new(strategy: S, epsilon: f64, max_n: usize, singletons: bool) -> Self {
        Self {
            fitter: Fitter::new(strategy, epsilon, max_n, singletons),
        }
    }

    pub fn feed(&mut self, p: Point, out: &mut VecDeque<Record>) {
        self.fitter.step(p, |fitted| out.push_back(fitted.into_record()));
    }

    pub fn finish(&mut self, out: &mut VecDeque<Record>) {
        self.fitter.finish(|fitted| out.push_back(fitted.into_record()));
    }
}

/// SingleStream whose zero-slope segments are shortened to `(-n, b)`
pub struct Lidar<S: FitStrategy> {
    inner: SingleStream<S>,
}

/// Rewrite a zero-slope segment as a flat record.
///
/// The slope test is exact: a fitted slope of `1e-17` stays a full segment.
pub(crate) fn flatten(record: &mut Record) {
    if let Record::Segment { n, line } = *record {
        if line.a == 0.0 {
            *record = Record::Flat { n, b: line.b };
        }
    }
}

impl<S: FitStrategy> Lidar<S> {
    #[must_use]
    pub fn new(strategy: S, epsilon: f64, max_n: usize, singletons: bool) -> Self {
        Self {
            inner: SingleStream::new(strategy, epsilon, max_n, singletons),
        }
    }

    pub fn feed(&mut self, p: Point, out: &mut VecDeque<Record>) {
        let start = out.len();
        self.inner.feed(p, out);
        out.iter_mut().skip(start).for_each(flatten);
    }

    pub fn finish(&mut self, out: &mut VecDeque<Record>) {
        let start = out.len();
        self.inner.finish(out);
        out.iter_mut().skip(start).for_each(flatten);
    }
}
