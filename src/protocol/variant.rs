//! SingleStreamVariant protocol: singletons travel in batches.

use std::collections::VecDeque;
use std::mem;

use crate::point::Point;
use crate::record::Record;
use crate::strategy::FitStrategy;

use super::single_stream::{Fitted, Fitter};

/// Emits `(-m, y0..ym-1)` batches and `(n, a, b)` segments.
///
/// A batch is closed when it reaches the maximum segment length, when a
/// segment follows it, or at end of stream.
pub struct Variant<S: FitStrategy> {
    fitter: Fitter<S>,
    max_n: usize,
    batch: Vec<f64>,
}

impl<S: FitStrategy> Variant<S> {
    #[must_use]
    pub fn new(strategy: S, epsilon: f64, max_n: usize, singletons: bool) -> Self {
        Self {
            fitter: Fitter::new(strategy, epsilon, max_n, singletons),
            max_n,
            batch: Vec::new(),
        }
    }

    pub fn feed(&mut self, p: Point, out: &mut VecDeque<Record>) {
        let (batch, max_n) = (&mut self.batch, self.max_n);
        self.fitter
            .step(p, |fitted| absorb(batch, max_n, fitted, out));
    }

    pub fn finish(&mut self, out: &mut VecDeque<Record>) {
        let (batch, max_n) = (&mut self.batch, self.max_n);
        self.fitter
            .finish(|fitted| absorb(batch, max_n, fitted, out));
        if !batch.is_empty() {
            out.push_back(Record::Batch(mem::take(batch)));
        }
    }
}

fn absorb(batch: &mut Vec<f64>, max_n: usize, fitted: Fitted, out: &mut VecDeque<Record>) {
    match fitted {
        Fitted::Isolated(y) => {
            batch.push(y);
            if batch.len() == max_n {
                out.push_back(Record::Batch(mem::take(batch)));
            }
        }
        segment @ Fitted::Segment { .. } => {
            if !batch.is_empty() {
                out.push_back(Record::Batch(mem::take(batch)));
            }
            out.push_back(segment.into_record());
        }
    }
}
