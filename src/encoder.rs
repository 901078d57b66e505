//! Binary encoder for protocol records.
//!
//! Every field is little-endian. A record opens with a counter of
//! `counter_bytes` width (two's complement for the lidar and variant
//! protocols); floats take `input_bytes` or `coefficient_bytes` and must be
//! 4 (`f32`) or 8 (`f64`) bytes wide.
//!
//! | Protocol | Layout |
//! |----------|--------|
//! | TwoStream | `m`, `m` values, `n` (0 = no segment), `start_x`, `a`, `b` |
//! | SingleStream | `1`, `y` or `n`, `a`, `b` |
//! | SingleStreamLidar | as SingleStream, plus `-n`, `b` |
//! | SingleStreamVariant | `-m`, `m` values or `n`, `a`, `b` |

use serde::{Deserialize, Serialize};

use crate::config::{ProtocolConfig, ProtocolKind};
use crate::constants::{signed_counter_range, unsigned_counter_max};
use crate::decoder::decode_records;
use crate::error::{DecodeError, EncodeError};
use crate::float::WireLayout;
use crate::geometry::Line;
use crate::record::Record;

/// Accumulates records into one byte buffer.
///
/// The buffer can be serialized and resumed; appending continues where it
/// left off as long as the same configuration is used.
#[derive(Clone, Serialize, Deserialize)]
pub struct Encoder {
    config: ProtocolConfig,
    /// Encoded records
    buf: Vec<u8>,
    count: usize,
}

impl Encoder {
    /// Create an empty encoder.
    ///
    /// # Errors
    /// Returns [`EncodeError::UnsupportedWidth`] if a float width is not 4 or
    /// 8 bytes, or the counter is not 1 to 8 bytes wide.
    pub fn new(config: ProtocolConfig) -> Result<Self, EncodeError> {
        layout(&config)?;
        Ok(Self {
            config,
            buf: Vec::new(),
            count: 0,
        })
    }

    /// Configuration the buffer is written with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Append one record.
    ///
    /// On error the buffer is left as it was before the call.
    ///
    /// # Errors
    /// - [`EncodeError::ProtocolMismatch`] if the configured protocol never
    ///   emits a record of this shape
    /// - [`EncodeError::CounterOverflow`] if a counter does not fit
    ///   `counter_bytes`
    pub fn append(&mut self, record: &Record) -> Result<(), EncodeError> {
        let layout = layout(&self.config)?;
        if !shape_allowed(layout.kind, record) {
            return Err(EncodeError::ProtocolMismatch { kind: layout.kind });
        }

        let start = self.buf.len();
        let written = write_record(&mut self.buf, &layout, record);
        if written.is_err() {
            self.buf.truncate(start);
        } else {
            self.count += 1;
        }
        written
    }

    /// Encoded size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }

    /// Number of records encoded
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Decode the encoder's contents back to records
    ///
    /// # Errors
    /// Propagates [`decode_records`] errors; a buffer built only through
    /// [`Encoder::append`] always decodes.
    pub fn decode(&self) -> Result<Vec<Record>, DecodeError> {
        decode_records(&self.buf, &self.config)
    }

    /// Return a copy of the encoded bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buf.clone()
    }

    /// Get a reference to the internal byte buffer
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Resume an encoder from a previously written buffer.
    ///
    /// # Errors
    /// Returns the decode error if `bytes` is not a valid record stream for
    /// `config`.
    pub fn from_bytes(config: ProtocolConfig, bytes: Vec<u8>) -> Result<Self, DecodeError> {
        let count = decode_records(&bytes, &config)?.len();
        Ok(Self {
            config,
            buf: bytes,
            count,
        })
    }
}

fn layout(config: &ProtocolConfig) -> Result<WireLayout, EncodeError> {
    WireLayout::resolve(config).map_err(|(field, bytes)| EncodeError::UnsupportedWidth { field, bytes })
}

/// Whether `kind` can emit `record`, including counters that decode back
/// to the same shape
fn shape_allowed(kind: ProtocolKind, record: &Record) -> bool {
    match (kind, record) {
        (ProtocolKind::TwoStream, Record::Run { values, segment }) => match segment {
            Some(segment) => segment.n > 0,
            None => !values.is_empty(),
        },
        (ProtocolKind::SingleStream | ProtocolKind::SingleStreamLidar, Record::Singleton(_)) => true,
        (
            ProtocolKind::SingleStream
            | ProtocolKind::SingleStreamLidar
            | ProtocolKind::SingleStreamVariant,
            Record::Segment { n, .. },
        ) => *n >= 2,
        (ProtocolKind::SingleStreamLidar, Record::Flat { n, .. }) => *n > 0,
        (ProtocolKind::SingleStreamVariant, Record::Batch(values)) => !values.is_empty(),
        _ => false,
    }
}

fn write_record(buf: &mut Vec<u8>, layout: &WireLayout, record: &Record) -> Result<(), EncodeError> {
    write_counter(buf, layout, record.counter())?;
    match record {
        Record::Run { values, segment } => {
            for &y in values {
                layout.input.write(y, buf);
            }
            match segment {
                Some(segment) => {
                    write_counter(buf, layout, to_counter(segment.n))?;
                    layout.input.write(segment.start_x, buf);
                    write_line(buf, layout, segment.line);
                }
                None => write_counter(buf, layout, 0)?,
            }
        }
        Record::Singleton(y) => layout.input.write(*y, buf),
        Record::Segment { line, .. } => write_line(buf, layout, *line),
        Record::Flat { b, .. } => layout.coefficient.write(*b, buf),
        Record::Batch(values) => {
            for &y in values {
                layout.input.write(y, buf);
            }
        }
    }
    Ok(())
}

#[inline]
fn to_counter(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[inline]
fn write_line(buf: &mut Vec<u8>, layout: &WireLayout, line: Line) {
    layout.coefficient.write(line.a, buf);
    layout.coefficient.write(line.b, buf);
}

fn write_counter(buf: &mut Vec<u8>, layout: &WireLayout, count: i64) -> Result<(), EncodeError> {
    let bytes = layout.counter_bytes;
    let fits = if layout.signed {
        let (min, max) = signed_counter_range(bytes);
        (min..=max).contains(&count)
    } else {
        count >= 0 && count.unsigned_abs() <= unsigned_counter_max(bytes)
    };
    if !fits {
        return Err(EncodeError::CounterOverflow { count, bytes });
    }
    buf.extend_from_slice(&count.to_le_bytes()[..bytes]);
    Ok(())
}
