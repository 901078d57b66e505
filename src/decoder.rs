//! Reconstruction of points from records, and the binary record parser.

use crate::config::{ProtocolConfig, ProtocolKind};
use crate::error::DecodeError;
use crate::float::{FloatWidth, WireLayout};
use crate::geometry::Line;
use crate::point::Point;
use crate::record::{AnchoredSegment, Reconstruction, Record};

/// Rebuild the points a record stands for, pulling one timestamp per point.
///
/// Loose values and batched values keep their stored `y`; segment points are
/// evaluated on the fitted line at their timestamp.
///
/// # Errors
/// Returns [`DecodeError::TimeSourceExhausted`] if `times` yields fewer
/// timestamps than the record covers. Timestamps already pulled are consumed.
pub fn reconstruct<T>(
    record: &Record,
    config: &ProtocolConfig,
    times: &mut T,
) -> Result<Reconstruction, DecodeError>
where
    T: Iterator<Item = f64>,
{
    let needed = record.point_count();
    let xs: Vec<f64> = times.take(needed).collect();
    if xs.len() < needed {
        return Err(DecodeError::TimeSourceExhausted {
            needed,
            available: xs.len(),
        });
    }

    let mut xs = xs.into_iter();
    let on_line = |line: Line| move |x: f64| Point::new(x, line.at(x));
    let points = match record {
        Record::Run { values, segment } => {
            let mut points: Vec<Point> = values
                .iter()
                .zip(&mut xs)
                .map(|(&y, x)| Point::new(x, y))
                .collect();
            if let Some(segment) = segment {
                points.extend(xs.map(on_line(segment.line)));
            }
            points
        }
        Record::Singleton(y) => xs.map(|x| Point::new(x, *y)).collect(),
        Record::Segment { line, .. } => xs.map(on_line(*line)).collect(),
        Record::Flat { b, .. } => xs.map(|x| Point::new(x, *b)).collect(),
        Record::Batch(values) => values
            .iter()
            .zip(xs)
            .map(|(&y, x)| Point::new(x, y))
            .collect(),
    };

    Ok(Reconstruction {
        points,
        cost: record_cost(record, config),
    })
}

/// Storage cost of a record in input-value equivalents.
///
/// | Record | Bytes charged |
/// |--------|---------------|
/// | `Run` | one input value per loose value, plus `input + counter + 2 coef` for a segment |
/// | `Singleton` | `counter + input` |
/// | `Segment` | `counter + 2 coef` |
/// | `Flat` | `counter + coef` |
/// | `Batch` of `m` | `counter + m * input` |
#[must_use]
pub fn record_cost(record: &Record, config: &ProtocolConfig) -> f64 {
    let counter = config.counter_bytes;
    let coef = config.coefficient_bytes;
    let input = config.input_bytes;
    match record {
        Record::Run { values, segment } => {
            let anchored = segment.map_or(0.0, |_| config.cost(input + counter + 2 * coef));
            values.len() as f64 + anchored
        }
        Record::Singleton(_) => config.cost(counter + input),
        Record::Segment { .. } => config.cost(counter + 2 * coef),
        Record::Flat { .. } => config.cost(counter + coef),
        Record::Batch(values) => config.cost(counter + values.len() * input),
    }
}

/// Parse a buffer written by [`Encoder`](crate::Encoder) back into records.
///
/// # Errors
/// - [`DecodeError::UnsupportedWidth`] if a configured width has no wire form
/// - [`DecodeError::BufferTooShort`] if the buffer ends inside a record
/// - [`DecodeError::UnknownCounter`] if a counter is invalid for `config.kind`
pub fn decode_records(buf: &[u8], config: &ProtocolConfig) -> Result<Vec<Record>, DecodeError> {
    let layout = WireLayout::resolve(config)
        .map_err(|(field, bytes)| DecodeError::UnsupportedWidth { field, bytes })?;
    let mut reader = ByteReader::new(buf);
    let mut records = Vec::new();
    while reader.has_more() {
        records.push(read_record(&mut reader, &layout)?);
    }
    Ok(records)
}

fn read_record(reader: &mut ByteReader<'_>, layout: &WireLayout) -> Result<Record, DecodeError> {
    let counter = reader.read_counter(layout)?;
    let unknown = DecodeError::UnknownCounter(counter);

    if layout.kind == ProtocolKind::TwoStream {
        let m = usize::try_from(counter).map_err(|_| unknown)?;
        let values = reader.read_values(m, layout.input)?;
        let n = reader.read_counter(layout)?;
        let segment = match usize::try_from(n) {
            Ok(0) if m == 0 => return Err(DecodeError::UnknownCounter(0)),
            Ok(0) => None,
            Ok(n) => Some(AnchoredSegment {
                start_x: reader.read_float(layout.input)?,
                n,
                line: reader.read_line(layout.coefficient)?,
            }),
            Err(_) => return Err(DecodeError::UnknownCounter(n)),
        };
        return Ok(Record::Run { values, segment });
    }

    match (layout.kind, counter) {
        (ProtocolKind::SingleStream | ProtocolKind::SingleStreamLidar, 1) => {
            Ok(Record::Singleton(reader.read_float(layout.input)?))
        }
        (_, c) if c >= 2 => Ok(Record::Segment {
            n: usize::try_from(c).map_err(|_| unknown)?,
            line: reader.read_line(layout.coefficient)?,
        }),
        (ProtocolKind::SingleStreamLidar, c) if c < 0 => Ok(Record::Flat {
            n: usize::try_from(c.unsigned_abs()).map_err(|_| unknown)?,
            b: reader.read_float(layout.coefficient)?,
        }),
        (ProtocolKind::SingleStreamVariant, c) if c < 0 => {
            let m = usize::try_from(c.unsigned_abs()).map_err(|_| unknown)?;
            Ok(Record::Batch(reader.read_values(m, layout.input)?))
        }
        _ => Err(unknown),
    }
}

/// Little-endian cursor over an encoded buffer
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    #[inline]
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn has_more(&self) -> bool {
        self.pos < self.buf.len()
    }

    /// Advance past `len` bytes, returning them
    #[inline]
    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos.saturating_add(len);
        if end > self.buf.len() {
            return Err(DecodeError::BufferTooShort {
                expected: end,
                actual: self.buf.len(),
            });
        }
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Read a counter, sign-extending it when the protocol uses signed counters
    #[allow(clippy::cast_possible_wrap)]
    fn read_counter(&mut self, layout: &WireLayout) -> Result<i64, DecodeError> {
        let bytes = self.take(layout.counter_bytes)?;
        let mut raw = [0u8; 8];
        raw[..bytes.len()].copy_from_slice(bytes);
        let value = u64::from_le_bytes(raw);
        if layout.signed {
            let shift = 64 - 8 * bytes.len() as u32;
            Ok(((value << shift) as i64) >> shift)
        } else {
            Ok(value as i64)
        }
    }

    #[inline]
    fn read_float(&mut self, width: FloatWidth) -> Result<f64, DecodeError> {
        Ok(width.read(self.take(width.bytes())?))
    }

    #[inline]
    fn read_line(&mut self, width: FloatWidth) -> Result<Line, DecodeError> {
        let a = self.read_float(width)?;
        let b = self.read_float(width)?;
        Ok(Line::new(a, b))
    }

    fn read_values(&mut self, m: usize, width: FloatWidth) -> Result<Vec<f64>, DecodeError> {
        let bytes = self.take(m.saturating_mul(width.bytes()))?;
        Ok(bytes.chunks_exact(width.bytes()).map(|chunk| width.read(chunk)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> ProtocolConfig {
        ProtocolConfig::default()
    }

    #[test]
    fn test_segment_points_follow_line() {
        let record = Record::Segment {
            n: 3,
            line: Line::new(2.0, 1.0),
        };
        let mut times = [0.0, 1.0, 2.0, 3.0].into_iter();
        let rec = reconstruct(&record, &single(), &mut times).unwrap();
        let ys: Vec<f64> = rec.points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![1.0, 3.0, 5.0]);
        assert_eq!(times.next(), Some(3.0));
        assert!((rec.cost - 17.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_values_come_before_segment() {
        let record = Record::Run {
            values: vec![7.0, 8.0],
            segment: Some(AnchoredSegment {
                start_x: 2.0,
                n: 2,
                line: Line::new(0.0, 4.0),
            }),
        };
        let config = single().with_kind(ProtocolKind::TwoStream);
        let rec = reconstruct(&record, &config, &mut (0..4).map(f64::from)).unwrap();
        let ys: Vec<f64> = rec.points.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![7.0, 8.0, 4.0, 4.0]);
        assert!((rec.cost - (2.0 + 25.0 / 8.0)).abs() < 1e-12);
    }

    #[test]
    fn test_exhausted_time_source() {
        let record = Record::Batch(vec![1.0, 2.0, 3.0]);
        let config = single().with_kind(ProtocolKind::SingleStreamVariant);
        let err = reconstruct(&record, &config, &mut [0.0, 1.0].into_iter()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TimeSourceExhausted {
                needed: 3,
                available: 2
            }
        );
    }

    #[test]
    fn test_costs_by_shape() {
        let config = single();
        assert!((record_cost(&Record::Singleton(1.0), &config) - 9.0 / 8.0).abs() < 1e-12);
        assert!((record_cost(&Record::Flat { n: 9, b: 1.0 }, &config) - 9.0 / 8.0).abs() < 1e-12);
        let batch = Record::Batch(vec![0.0; 3]);
        assert!((record_cost(&batch, &config) - 25.0 / 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_counter_sign_extends() {
        let layout = WireLayout::resolve(&single().with_kind(ProtocolKind::SingleStreamLidar))
            .unwrap();
        let mut reader = ByteReader::new(&[0xfd, 0xff]);
        assert_eq!(reader.read_counter(&layout).unwrap(), -3);
    }

    #[test]
    fn test_truncated_buffer() {
        // counter 2 announces a segment but only one coefficient follows
        let mut buf = vec![2u8];
        buf.extend_from_slice(&1.0f64.to_le_bytes());
        assert_eq!(
            decode_records(&buf, &single()),
            Err(DecodeError::BufferTooShort {
                expected: 17,
                actual: 9
            })
        );
    }

    #[test]
    fn test_zero_counter_is_unknown() {
        assert_eq!(
            decode_records(&[0], &single()),
            Err(DecodeError::UnknownCounter(0))
        );
        let variant = single().with_kind(ProtocolKind::SingleStreamVariant);
        assert_eq!(
            decode_records(&[1, 0], &variant),
            Err(DecodeError::UnknownCounter(1))
        );
    }

    #[test]
    fn test_huge_batch_count_fails_without_allocating() {
        let config = single()
            .with_kind(ProtocolKind::SingleStreamVariant)
            .with_counter_bytes(8);
        let buf = i64::MIN.to_le_bytes();
        assert!(matches!(
            decode_records(&buf, &config),
            Err(DecodeError::BufferTooShort { .. }) | Err(DecodeError::UnknownCounter(_))
        ));
    }
}
