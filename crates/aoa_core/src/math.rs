//! Fixed-point math utilities for deterministic damage arithmetic.
//!
//! Counter bonuses multiply damage by 1.5, so damage totals carry a
//! fractional part. Floating-point results can differ between CPUs;
//! all combat math goes through [`Fixed`] instead.

use fixed::types::I32F32;

/// Fixed-point number type for all combat math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Build a fixed-point ratio `numerator / denominator`.
///
/// # Panics
///
/// Panics if `denominator` is zero.
#[must_use]
pub fn ratio(numerator: u32, denominator: u32) -> Fixed {
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// Number of whole `divisor`s contained in `value`, rounding down.
///
/// Negative values yield zero.
#[must_use]
pub fn whole_multiples(value: Fixed, divisor: u32) -> u32 {
    if value <= Fixed::ZERO || divisor == 0 {
        return 0;
    }
    (value / Fixed::from_num(divisor)).floor().to_num::<u32>()
}
