//! `plastream` - Error-bounded piecewise-linear approximation of numeric streams
//!
//! Replaces runs of `(x, y)` points with line segments whose every covered
//! point stays within `epsilon` of its original value, in a single forward
//! pass with no backtracking. Points that cannot join a segment are kept
//! verbatim as singletons.
//!
//! # Features
//! - **Three fit strategies**: slope interval ([`AngleStrategy`]), dual convex
//!   hull corridor ([`ConvexHullStrategy`], maximal for one pass), and
//!   incremental least squares ([`LinearRegressionStrategy`])
//! - **Four wire protocols**: selected once through [`ProtocolConfig`]
//! - **Lazy**: points are pulled only as records are requested
//! - **Aligned output**: [`StreamCompressor::genplastream`] yields one entry per
//!   input point, for lockstep validation against the raw stream
//!
//! # Example
//! ```
//! use plastream::{ConvexHullStrategy, Point, ProtocolConfig, Record, StreamCompressor};
//!
//! let compressor = StreamCompressor::new(ConvexHullStrategy, ProtocolConfig::default()).unwrap();
//! let points = (0..4).map(|i| Point::new(f64::from(i), f64::from(i)));
//!
//! let records: Vec<Record> = compressor.compress(points, 0.0).unwrap().collect();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].point_count(), 4);
//!
//! // Rebuild the points from an order-matched time source
//! let mut times = (0..4).map(f64::from);
//! let rebuilt = compressor.reconstruct(&records[0], &mut times).unwrap();
//! assert_eq!(rebuilt.points.len(), 4);
//! ```
//!
//! # Records
//!
//! | Protocol | Records | Singleton fallback |
//! |----------|---------|--------------------|
//! | `TwoStream` | `(L, (x0, n, a, b) \| none)` | loose value in `L` while `n < 4` |
//! | `SingleStream` | `(1, y)`, `(n, a, b)` | `(1, y)` while `n == 2` |
//! | `SingleStreamLidar` | as SingleStream, plus `(-n, b)` for zero slope | as SingleStream |
//! | `SingleStreamVariant` | `(-m, y0..ym-1)`, `(n, a, b)` | appended to the open batch |
//!
//! # Cost
//!
//! Each reconstruction carries its record's cost in input-value
//! equivalents: record bytes divided by `input_bytes`. A segment costs
//! `(counter_bytes + 2 * coefficient_bytes) / input_bytes`. See
//! [`decoder::record_cost`] for the full table.
//!
//! # Wire Format
//!
//! [`Encoder`] writes records as little-endian fields: a counter of
//! `counter_bytes` (signed for the lidar and variant protocols, which widens
//! the default counter to two bytes), then values
//! of `input_bytes` and coefficients of `coefficient_bytes`. Float widths are
//! 4 (`f32`) or 8 (`f64`) bytes. [`decode_records`] parses them back.
//!
//! ## Supported Ranges
//! - Counters: 1 to 8 bytes
//! - Segment length: 2 (3 for TwoStream) up to `max_segment_length`
//! - Error bound: finite and non-negative

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

mod compressor;
mod config;
mod constants;
pub mod decoder;
mod encoder;
mod error;
mod float;
pub mod geometry;
mod point;
pub mod protocol;
mod record;
pub mod strategy;
pub mod timestream;

#[cfg(test)]
mod tests;

// Re-export public API
pub use compressor::{Aligned, Compress, PlaStream, StreamCompressor};
pub use config::{validate_epsilon, ProtocolConfig, ProtocolKind};
pub use constants::{counter_bytes_for_bound, REGRESSION_TOLERANCE, TIMESTAMP_DELTA};
pub use decoder::{decode_records, reconstruct};
pub use encoder::Encoder;
pub use error::{ConfigError, DecodeError, EncodeError};
pub use float::WireFloat;
pub use geometry::Line;
pub use point::Point;
pub use record::{AnchoredSegment, Reconstruction, Record};
pub use strategy::{
    AngleSegment, AngleStrategy, CandidateSegment, ConvexHullSegment, ConvexHullStrategy,
    FitStrategy, LinearRegressionSegment, LinearRegressionStrategy,
};
pub use timestream::{approximate_timestamps, logical_times, timestamps};
