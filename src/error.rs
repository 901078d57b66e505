//! Error types for configuration, reconstruction and wire encoding.

use std::fmt;

use crate::config::ProtocolKind;

/// Error returned when a compressor or protocol configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Error bound is negative, infinite or NaN
    InvalidEpsilon(f64),
    /// Maximum segment length is below what the protocol can emit
    SegmentTooShort {
        max_segment_length: usize,
        minimum: usize,
    },
    /// A byte width is zero
    ZeroByteWidth { field: &'static str },
    /// Counter width cannot hold the longest record the protocol emits
    CounterTooNarrow {
        kind: ProtocolKind,
        max_segment_length: usize,
        counter_bytes: usize,
    },
}

/// Error returned when a record cannot be reconstructed or parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The time source ran dry before every point of a record got its timestamp
    TimeSourceExhausted { needed: usize, available: usize },
    /// Buffer is too short to contain the next record
    BufferTooShort { expected: usize, actual: usize },
    /// Counter value is not valid for the configured protocol
    UnknownCounter(i64),
    /// Float field width other than 4 or 8 bytes, or a counter wider than 8
    UnsupportedWidth { field: &'static str, bytes: usize },
}

/// Error returned when a record cannot be written to the wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Counter does not fit the configured counter width
    CounterOverflow { count: i64, bytes: usize },
    /// Float field width other than 4 or 8 bytes, or a counter wider than 8
    UnsupportedWidth { field: &'static str, bytes: usize },
    /// Record shape is never produced by the configured protocol
    ProtocolMismatch { kind: ProtocolKind },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEpsilon(epsilon) => {
                write!(f, "error bound {epsilon} must be finite and non-negative")
            }
            Self::SegmentTooShort {
                max_segment_length,
                minimum,
            } => {
                write!(
                    f,
                    "maximum segment length {max_segment_length} is below the minimum of {minimum}"
                )
            }
            Self::ZeroByteWidth { field } => write!(f, "byte width `{field}` must be positive"),
            Self::CounterTooNarrow {
                kind,
                max_segment_length,
                counter_bytes,
            } => {
                write!(
                    f,
                    "{counter_bytes}-byte {kind:?} counter cannot hold segments of {max_segment_length}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeSourceExhausted { needed, available } => {
                write!(f, "time source exhausted: record needs {needed} timestamps, got {available}")
            }
            Self::BufferTooShort { expected, actual } => {
                write!(f, "buffer too short: expected at least {expected} bytes, got {actual}")
            }
            Self::UnknownCounter(counter) => {
                write!(f, "counter {counter} is not valid for this protocol")
            }
            Self::UnsupportedWidth { field, bytes } => {
                write!(f, "unsupported width for `{field}`: {bytes} bytes")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CounterOverflow { count, bytes } => {
                write!(f, "counter {count} does not fit in {bytes} bytes")
            }
            Self::UnsupportedWidth { field, bytes } => {
                write!(f, "unsupported width for `{field}`: {bytes} bytes")
            }
            Self::ProtocolMismatch { kind } => {
                write!(f, "record shape is not produced by the {kind:?} protocol")
            }
        }
    }
}

impl std::error::Error for EncodeError {}
