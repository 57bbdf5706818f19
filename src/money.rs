//! Whole-unit money helpers shared by the calculations.
//!
//! Amounts that leave this module are `i64` currency units. Anything that is
//! not a finite number collapses to zero so an allocation never carries a
//! NaN or an infinity.

/// Truncates toward zero, the rounding rule used for every per-member amount.
pub fn floor_units(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc() as i64
}

/// Rounds half away from zero. Pool totals are non-negative, so this matches
/// round-half-up for every value the pool ever sees.
pub fn round_units(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    value.round() as i64
}

pub fn percent_of(amount: f64, percentage: f64) -> f64 {
    amount * percentage / 100.0
}

/// Share of the eligible amount that was actually allocated, in percent.
/// Zero eligible amounts report 0 instead of dividing by zero.
pub fn allocation_percentage(actual_allocation: i64, eligible_amount: f64) -> f64 {
    if eligible_amount <= 0.0 || !eligible_amount.is_finite() {
        return 0.0;
    }
    actual_allocation as f64 / eligible_amount * 100.0
}
