//! Streaming driver: binds a strategy and a protocol to one point stream.

use std::collections::VecDeque;
use std::mem;

use log::{debug, trace};

use crate::config::{validate_epsilon, ProtocolConfig};
use crate::decoder;
use crate::error::{ConfigError, DecodeError};
use crate::point::Point;
use crate::protocol::Protocol;
use crate::record::{Reconstruction, Record};
use crate::strategy::FitStrategy;

/// One strategy and one validated protocol configuration.
///
/// Each call to [`compress`](Self::compress) or
/// [`genplastream`](Self::genplastream) starts an independent run with its
/// own in-flight segment; runs never share state.
#[derive(Debug, Clone)]
pub struct StreamCompressor<S> {
    strategy: S,
    config: ProtocolConfig,
}

impl<S: FitStrategy + Clone> StreamCompressor<S> {
    /// # Errors
    /// Returns the [`ConfigError`] of [`ProtocolConfig::validate`].
    pub fn new(strategy: S, config: ProtocolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { strategy, config })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Lazily compress `points` under error bound `epsilon`.
    ///
    /// Points are pulled only as records are requested; dropping the
    /// iterator discards any partially built segment.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEpsilon`] for negative, infinite or NaN
    /// bounds.
    pub fn compress<I>(&self, points: I, epsilon: f64) -> Result<Compress<I::IntoIter, S>, ConfigError>
    where
        I: IntoIterator<Item = Point>,
    {
        validate_epsilon(epsilon)?;
        debug!(
            "compress: protocol={:?} epsilon={} max_n={} singletons={}",
            self.config.kind, epsilon, self.config.max_segment_length, self.config.singletons
        );
        Ok(Compress {
            source: points.into_iter(),
            protocol: Protocol::new(self.strategy.clone(), &self.config, epsilon),
            ready: VecDeque::new(),
            exhausted: false,
            consumed: 0,
            emitted: 0,
        })
    }

    /// Rebuild a record's points from `times`; see [`decoder::reconstruct`].
    ///
    /// # Errors
    /// Returns [`DecodeError::TimeSourceExhausted`] if `times` runs dry.
    pub fn reconstruct<T>(&self, record: &Record, times: &mut T) -> Result<Reconstruction, DecodeError>
    where
        T: Iterator<Item = f64>,
    {
        decoder::reconstruct(record, &self.config, times)
    }

    /// Compress `points` and realign every reconstruction with the input.
    ///
    /// The returned stream yields exactly one [`Aligned`] entry per input
    /// point, in input order. Each record's reconstruction is attached to
    /// the last point consumed before the record was known; every other
    /// entry carries `None`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEpsilon`] for invalid bounds.
    pub fn genplastream<I, T>(
        &self,
        points: I,
        epsilon: f64,
        times: T,
    ) -> Result<PlaStream<I::IntoIter, T::IntoIter, S>, ConfigError>
    where
        I: IntoIterator<Item = Point>,
        T: IntoIterator<Item = f64>,
    {
        let records = self.compress(
            Recording {
                inner: points.into_iter(),
                seen: Vec::new(),
            },
            epsilon,
        )?;
        Ok(PlaStream {
            records,
            times: times.into_iter(),
            config: self.config,
            ready: VecDeque::new(),
            anchor: None,
            pending: None,
            finished: false,
        })
    }
}

/// Lazy record stream of one compression run
pub struct Compress<I, S: FitStrategy> {
    source: I,
    protocol: Protocol<S>,
    /// Records completed but not yet handed out
    ready: VecDeque<Record>,
    exhausted: bool,
    consumed: usize,
    emitted: usize,
}

impl<I, S: FitStrategy> Compress<I, S> {
    /// Points pulled from the source so far
    #[inline]
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    #[inline]
    pub(crate) fn source_mut(&mut self) -> &mut I {
        &mut self.source
    }
}

impl<I, S> Iterator for Compress<I, S>
where
    I: Iterator<Item = Point>,
    S: FitStrategy,
{
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        loop {
            if let Some(record) = self.ready.pop_front() {
                self.emitted += 1;
                trace!("record {}: {:?}", self.emitted, record);
                return Some(record);
            }
            if self.exhausted {
                return None;
            }
            match self.source.next() {
                Some(p) => {
                    self.consumed += 1;
                    self.protocol.feed(p, &mut self.ready);
                }
                None => {
                    self.exhausted = true;
                    self.protocol.finish(&mut self.ready);
                    debug!(
                        "compress: source exhausted after {} points, {} records",
                        self.consumed,
                        self.emitted + self.ready.len()
                    );
                }
            }
        }
    }
}

/// Point source that remembers what it handed out since the last drain
pub(crate) struct Recording<I> {
    inner: I,
    seen: Vec<Point>,
}

impl<I: Iterator<Item = Point>> Iterator for Recording<I> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let p = self.inner.next()?;
        self.seen.push(p);
        Some(p)
    }
}

/// One input point with the reconstruction resolved at it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct Aligned {
    pub point: Point,
    pub reconstruction: Option<Reconstruction>,
}

/// Input-aligned stream produced by [`StreamCompressor::genplastream`]
pub struct PlaStream<I, T, S: FitStrategy> {
    records: Compress<Recording<I>, S>,
    times: T,
    config: ProtocolConfig,
    ready: VecDeque<Aligned>,
    /// Last point consumed before the pending group's records were known
    anchor: Option<Point>,
    pending: Option<Reconstruction>,
    finished: bool,
}

impl<I, T, S> PlaStream<I, T, S>
where
    I: Iterator<Item = Point>,
    T: Iterator<Item = f64>,
    S: FitStrategy,
{
    fn resolve(&mut self, reconstruction: Reconstruction) {
        let buffered = mem::take(&mut self.records.source_mut().seen);
        let Some((&last, rest)) = buffered.split_last() else {
            self.pending
                .get_or_insert_with(Reconstruction::default)
                .merge(reconstruction);
            return;
        };

        if let Some(anchor) = self.anchor.take() {
            self.ready.push_back(Aligned {
                point: anchor,
                reconstruction: self.pending.take(),
            });
        }
        self.ready.extend(rest.iter().map(|&point| Aligned {
            point,
            reconstruction: None,
        }));
        self.anchor = Some(last);
        self.pending = Some(reconstruction);
    }

    fn close(&mut self) {
        self.finished = true;
        if let Some(anchor) = self.anchor.take() {
            self.ready.push_back(Aligned {
                point: anchor,
                reconstruction: self.pending.take(),
            });
        }
        let leftover = mem::take(&mut self.records.source_mut().seen);
        self.ready.extend(leftover.into_iter().map(|point| Aligned {
            point,
            reconstruction: None,
        }));
    }
}

impl<I, T, S> Iterator for PlaStream<I, T, S>
where
    I: Iterator<Item = Point>,
    T: Iterator<Item = f64>,
    S: FitStrategy,
{
    type Item = Result<Aligned, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.ready.pop_front() {
                return Some(Ok(entry));
            }
            if self.finished {
                return None;
            }
            match self.records.next() {
                Some(record) => {
                    match decoder::reconstruct(&record, &self.config, &mut self.times) {
                        Ok(reconstruction) => self.resolve(reconstruction),
                        Err(err) => {
                            self.finished = true;
                            return Some(Err(err));
                        }
                    }
                }
                None => self.close(),
            }
        }
    }
}
