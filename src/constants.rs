//! Tolerances, default widths and small numeric helpers shared across the crate.

/// Nudge applied to non-increasing timestamps so reconstruction can pair
/// records with a strictly ordered time source.
pub const TIMESTAMP_DELTA: f64 = 1e-5;

/// Slack used by the regression strategy when validating its best-fit line.
pub const REGRESSION_TOLERANCE: f64 = 1e-10;

/// Default bound on the segment counter (also the default maximum segment length)
pub(crate) const DEFAULT_BOUND: u64 = 255;

/// Default width in bytes of one input value (f64)
pub(crate) const DEFAULT_INPUT_BYTES: usize = 8;

/// Default width in bytes of one line coefficient (f64)
pub(crate) const DEFAULT_COEFFICIENT_BYTES: usize = 8;

/// Counter width used by the "natural counter" mode
pub(crate) const NATURAL_COUNTER_BYTES: usize = 4;

/// Bound used by the "natural counter" mode
pub(crate) const NATURAL_BOUND: u64 = u32::MAX as u64;

/// Number of bytes needed to store a counter for a declared `bound`.
///
/// `floor(bitlen(bound / 2) / 8) + 1`, so 255 fits one byte, 65535 two.
#[inline]
#[must_use]
pub const fn counter_bytes_for_bound(bound: u64) -> usize {
    let half = bound / 2;
    let bit_len = (u64::BITS - half.leading_zeros()) as usize;
    bit_len / 8 + 1
}

/// Largest magnitude an unsigned counter of `bytes` width can hold
#[inline]
pub(crate) const fn unsigned_counter_max(bytes: usize) -> u64 {
    if bytes >= 8 {
        u64::MAX
    } else {
        (1u64 << (bytes * 8)) - 1
    }
}

/// Range of a two's-complement counter of `bytes` width
#[inline]
pub(crate) const fn signed_counter_range(bytes: usize) -> (i64, i64) {
    if bytes >= 8 {
        (i64::MIN, i64::MAX)
    } else {
        let half = 1i64 << (bytes * 8 - 1);
        (-half, half - 1)
    }
}
