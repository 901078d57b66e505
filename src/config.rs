//! Protocol selection and byte-width configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    counter_bytes_for_bound, signed_counter_range, unsigned_counter_max, DEFAULT_BOUND,
    DEFAULT_COEFFICIENT_BYTES, DEFAULT_INPUT_BYTES, NATURAL_BOUND, NATURAL_COUNTER_BYTES,
};
use crate::error::ConfigError;

/// Wire protocol used to turn fitted segments into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProtocolKind {
    /// Loose values and anchored segments in one record, 3-point lookahead
    TwoStream,
    /// `(1, y)` singletons and `(n, a, b)` segments
    #[default]
    SingleStream,
    /// SingleStream with flat segments shortened to `(-n, b)`
    SingleStreamLidar,
    /// SingleStream with singletons batched as `(-m, y0..ym-1)`
    SingleStreamVariant,
}

impl ProtocolKind {
    /// Smallest maximum segment length this protocol can honor
    #[must_use]
    pub const fn min_segment_length(self) -> usize {
        match self {
            Self::TwoStream => 3,
            _ => 2,
        }
    }

    /// Whether wire counters can be negative
    #[must_use]
    pub const fn signed_counters(self) -> bool {
        matches!(self, Self::SingleStreamLidar | Self::SingleStreamVariant)
    }

    /// Counter width whose range holds every length up to `bound`.
    ///
    /// Signed counters need one more bit, so a bound of 255 takes one
    /// byte unsigned and two bytes signed.
    #[must_use]
    pub const fn counter_bytes(self, bound: u64) -> usize {
        if self.signed_counters() {
            counter_bytes_for_bound(bound.saturating_mul(2))
        } else {
            counter_bytes_for_bound(bound)
        }
    }

    /// Whether a counter of `bytes` width holds every length up to `bound`
    #[must_use]
    pub const fn counter_holds(self, bytes: usize, bound: u64) -> bool {
        if bytes == 0 {
            bound == 0
        } else if self.signed_counters() {
            let (_, max) = signed_counter_range(bytes);
            bound <= max as u64
        } else {
            bound <= unsigned_counter_max(bytes)
        }
    }
}

/// Immutable parameters of one compression run.
///
/// Byte widths only drive cost accounting and the binary wire format; the
/// fitting itself always works on `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub kind: ProtocolKind,
    /// Longest segment a record may cover
    pub max_segment_length: usize,
    /// Width of a record counter
    pub counter_bytes: usize,
    /// Width of one line coefficient
    pub coefficient_bytes: usize,
    /// Width of one raw input value
    pub input_bytes: usize,
    /// Emit unapproximated points instead of 2-point segments
    pub singletons: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self::from_bound(ProtocolKind::default(), DEFAULT_BOUND)
    }
}

impl ProtocolConfig {
    /// Config whose segment length and counter width derive from `bound`
    #[must_use]
    pub fn from_bound(kind: ProtocolKind, bound: u64) -> Self {
        Self {
            kind,
            max_segment_length: usize::try_from(bound).unwrap_or(usize::MAX),
            counter_bytes: kind.counter_bytes(bound),
            coefficient_bytes: DEFAULT_COEFFICIENT_BYTES,
            input_bytes: DEFAULT_INPUT_BYTES,
            singletons: true,
        }
    }

    /// "Natural counter" mode: 4-byte counters, bound `2^32 - 1`
    /// (`2^31 - 1` for signed counters)
    #[must_use]
    pub fn natural(kind: ProtocolKind) -> Self {
        let bound = if kind.signed_counters() {
            i32::MAX as u64
        } else {
            NATURAL_BOUND
        };
        Self {
            counter_bytes: NATURAL_COUNTER_BYTES,
            ..Self::from_bound(kind, bound)
        }
    }

    /// Switch protocol, widening the counter if the new kind needs it
    #[must_use]
    pub fn with_kind(mut self, kind: ProtocolKind) -> Self {
        self.kind = kind;
        self.widen_counter()
    }

    /// Set the segment cap, widening the counter if the cap needs it
    #[must_use]
    pub fn with_max_segment_length(mut self, max_segment_length: usize) -> Self {
        self.max_segment_length = max_segment_length;
        self.widen_counter()
    }

    fn widen_counter(mut self) -> Self {
        let required = self.kind.counter_bytes(self.max_segment_length as u64);
        self.counter_bytes = self.counter_bytes.max(required);
        self
    }

    #[must_use]
    pub fn with_counter_bytes(mut self, bytes: usize) -> Self {
        self.counter_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_coefficient_bytes(mut self, bytes: usize) -> Self {
        self.coefficient_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_input_bytes(mut self, bytes: usize) -> Self {
        self.input_bytes = bytes;
        self
    }

    #[must_use]
    pub fn with_singletons(mut self, singletons: bool) -> Self {
        self.singletons = singletons;
        self
    }

    /// Reject configurations no protocol run can honor.
    ///
    /// # Errors
    /// - [`ConfigError::SegmentTooShort`] if `max_segment_length` is below
    ///   2 (3 for [`ProtocolKind::TwoStream`])
    /// - [`ConfigError::ZeroByteWidth`] if any width is zero
    /// - [`ConfigError::CounterTooNarrow`] if a record of `max_segment_length`
    ///   points overflows the counter, signed for lidar and variant
    pub fn validate(&self) -> Result<(), ConfigError> {
        let minimum = self.kind.min_segment_length();
        if self.max_segment_length < minimum {
            return Err(ConfigError::SegmentTooShort {
                max_segment_length: self.max_segment_length,
                minimum,
            });
        }
        for (field, bytes) in [
            ("counter_bytes", self.counter_bytes),
            ("coefficient_bytes", self.coefficient_bytes),
            ("input_bytes", self.input_bytes),
        ] {
            if bytes == 0 {
                return Err(ConfigError::ZeroByteWidth { field });
            }
        }
        if !self
            .kind
            .counter_holds(self.counter_bytes, self.max_segment_length as u64)
        {
            return Err(ConfigError::CounterTooNarrow {
                kind: self.kind,
                max_segment_length: self.max_segment_length,
                counter_bytes: self.counter_bytes,
            });
        }
        Ok(())
    }

    /// Cost, in input-value equivalents, of `bytes` record bytes
    #[inline]
    #[must_use]
    pub fn cost(&self, bytes: usize) -> f64 {
        bytes as f64 / self.input_bytes as f64
    }
}

/// Check an error bound before a run starts.
///
/// # Errors
/// Returns [`ConfigError::InvalidEpsilon`] for negative, infinite or NaN bounds.
pub fn validate_epsilon(epsilon: f64) -> Result<(), ConfigError> {
    if epsilon.is_finite() && epsilon >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidEpsilon(epsilon))
    }
}
