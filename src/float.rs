//! Float types for wire fields with configurable widths, and the resolved
//! field layout shared by the encoder and decoder.
//!
//! Uses the sealed trait pattern to restrict implementations to f32 and f64.

use std::fmt::Debug;

use crate::config::{ProtocolConfig, ProtocolKind};

/// Private module to seal the trait - users cannot implement `WireFloat` for other types
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A float representation a coefficient or value can be stored in.
///
/// This trait is sealed - it can only be implemented for `f32` and `f64`.
pub trait WireFloat: private::Sealed + Copy + Debug + PartialEq + Default {
    /// Number of bytes one value occupies on the wire
    const BYTES: usize;

    /// Narrow from the f64 used during fitting
    fn from_f64(v: f64) -> Self;

    /// Widen back to f64
    fn to_f64(self) -> f64;

    /// Append value to buffer (little-endian)
    fn write_le(self, buf: &mut Vec<u8>);

    /// Read value from byte slice (little-endian)
    /// Caller must ensure the slice holds at least `BYTES` bytes
    fn read_le(buf: &[u8]) -> Self;
}

impl WireFloat for f32 {
    const BYTES: usize = 4;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as Self
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn write_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(buf: &[u8]) -> Self {
        Self::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
    }
}

impl WireFloat for f64 {
    const BYTES: usize = 8;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn write_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(buf: &[u8]) -> Self {
        Self::from_le_bytes([buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7]])
    }
}

/// Width of a float field, resolved once from a byte count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FloatWidth {
    Single,
    Double,
}

impl FloatWidth {
    #[inline]
    pub(crate) const fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            4 => Some(Self::Single),
            8 => Some(Self::Double),
            _ => None,
        }
    }

    #[inline]
    pub(crate) const fn bytes(self) -> usize {
        match self {
            Self::Single => f32::BYTES,
            Self::Double => f64::BYTES,
        }
    }

    #[inline]
    pub(crate) fn write(self, v: f64, buf: &mut Vec<u8>) {
        match self {
            Self::Single => f32::from_f64(v).write_le(buf),
            Self::Double => v.write_le(buf),
        }
    }

    /// Caller must ensure the slice holds at least `bytes()` bytes
    #[inline]
    pub(crate) fn read(self, buf: &[u8]) -> f64 {
        match self {
            Self::Single => f32::read_le(buf).to_f64(),
            Self::Double => f64::read_le(buf),
        }
    }
}

/// Largest counter width the wire format can carry
const MAX_COUNTER_BYTES: usize = 8;

/// Field widths of one wire stream, checked once per encoder or decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WireLayout {
    pub(crate) kind: ProtocolKind,
    pub(crate) counter_bytes: usize,
    pub(crate) signed: bool,
    pub(crate) input: FloatWidth,
    pub(crate) coefficient: FloatWidth,
}

impl WireLayout {
    /// Resolve the widths of `config`, returning the offending field on failure.
    pub(crate) fn resolve(config: &ProtocolConfig) -> Result<Self, (&'static str, usize)> {
        if config.counter_bytes == 0 || config.counter_bytes > MAX_COUNTER_BYTES {
            return Err(("counter_bytes", config.counter_bytes));
        }
        let input = FloatWidth::from_bytes(config.input_bytes)
            .ok_or(("input_bytes", config.input_bytes))?;
        let coefficient = FloatWidth::from_bytes(config.coefficient_bytes)
            .ok_or(("coefficient_bytes", config.coefficient_bytes))?;
        Ok(Self {
            kind: config.kind,
            counter_bytes: config.counter_bytes,
            signed: config.kind.signed_counters(),
            input,
            coefficient,
        })
    }
}
