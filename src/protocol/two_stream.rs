//! TwoStream protocol: loose values and anchored segments share one record.

use std::collections::VecDeque;
use std::mem;

use crate::point::Point;
use crate::record::{AnchoredSegment, Record};
use crate::strategy::{CandidateSegment, FitStrategy};

/// Shortest segment flushed while singletons are enabled
const MIN_FLUSHED_SEGMENT: usize = 4;

enum Window<C> {
    Empty,
    One(Point),
    Two(Point, Point),
    Fitting {
        p0: Point,
        p1: Point,
        p2: Point,
        n: usize,
        candidate: C,
    },
}

/// Emits `(L, segment)` records where `L` holds the values that preceded
/// the segment without fitting one themselves.
pub struct TwoStream<S: FitStrategy> {
    strategy: S,
    epsilon: f64,
    max_n: usize,
    singletons: bool,
    window: Window<S::Segment>,
    /// Values waiting for the next record
    loose: Vec<f64>,
}

impl<S: FitStrategy> TwoStream<S> {
    #[must_use]
    pub fn new(strategy: S, epsilon: f64, max_n: usize, singletons: bool) -> Self {
        Self {
            strategy,
            epsilon,
            max_n,
            singletons,
            window: Window::Empty,
            loose: Vec::new(),
        }
    }

    /// Queue a value that fits no segment, handing out a segment-less run
    /// once `max_n` of them are waiting.
    fn push_loose(&mut self, y: f64, out: &mut VecDeque<Record>) {
        self.loose.push(y);
        if self.loose.len() >= self.max_n {
            out.push_back(Record::Run {
                values: mem::take(&mut self.loose),
                segment: None,
            });
        }
    }

    /// Try to open a segment on three points, sliding past `p0` until one fits.
    fn open(
        &mut self,
        p0: Point,
        p1: Point,
        p2: Point,
        out: &mut VecDeque<Record>,
    ) -> Window<S::Segment> {
        let mut candidate = self.strategy.initialize(p0, p1, self.epsilon);
        if candidate.check(p2) {
            candidate.update(p2);
            Window::Fitting {
                p0,
                p1,
                p2,
                n: 3,
                candidate,
            }
        } else {
            self.push_loose(p0.y, out);
            Window::Two(p1, p2)
        }
    }

    pub fn feed(&mut self, p: Point, out: &mut VecDeque<Record>) {
        self.window = match mem::replace(&mut self.window, Window::Empty) {
            Window::Empty => Window::One(p),
            Window::One(p0) => Window::Two(p0, p),
            Window::Two(p0, p1) => self.open(p0, p1, p, out),
            Window::Fitting {
                p0,
                p1,
                p2,
                n,
                mut candidate,
            } => {
                if n < self.max_n && candidate.check(p) {
                    candidate.update(p);
                    Window::Fitting {
                        p0,
                        p1,
                        p2,
                        n: n + 1,
                        candidate,
                    }
                } else if self.singletons && n < MIN_FLUSHED_SEGMENT {
                    self.push_loose(p0.y, out);
                    self.open(p1, p2, p, out)
                } else {
                    out.push_back(Record::Run {
                        values: mem::take(&mut self.loose),
                        segment: Some(AnchoredSegment {
                            start_x: p0.x,
                            n,
                            line: candidate.flush(),
                        }),
                    });
                    Window::One(p)
                }
            }
        };
    }

    pub fn finish(&mut self, out: &mut VecDeque<Record>) {
        match mem::replace(&mut self.window, Window::Empty) {
            Window::Empty => {}
            Window::One(p0) => self.push_loose(p0.y, out),
            Window::Two(p0, p1) => {
                for p in [p0, p1] {
                    self.push_loose(p.y, out);
                }
            }
            Window::Fitting { p0, p1, p2, n, .. } if n < MIN_FLUSHED_SEGMENT => {
                for p in [p0, p1, p2] {
                    self.push_loose(p.y, out);
                }
            }
            Window::Fitting {
                p0, n, candidate, ..
            } => {
                out.push_back(Record::Run {
                    values: mem::take(&mut self.loose),
                    segment: Some(AnchoredSegment {
                        start_x: p0.x,
                        n,
                        line: candidate.flush(),
                    }),
                });
                return;
            }
        }
        if !self.loose.is_empty() {
            out.push_back(Record::Run {
                values: mem::take(&mut self.loose),
                segment: None,
            });
        }
    }
}
