//! Numeric safety helpers
//!
//! Every guarded division in the extractor goes through [`safe_ratio`], and
//! every value leaving it goes through [`finite_or`].

/// Divide `numerator` by `denominator`, returning `default` when the
/// denominator is zero or the quotient is not finite.
#[inline]
pub fn safe_ratio(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        return default;
    }
    finite_or(numerator / denominator, default)
}

/// Replace NaN and infinities with `default`
#[inline]
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}
