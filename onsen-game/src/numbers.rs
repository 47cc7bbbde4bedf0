//! Numeric helpers centralizing rounding rules and safe numeric casts.

use num_traits::cast::cast;

/// Floor division for a positive divisor. Returns 0 when the divisor is not positive.
#[must_use]
pub const fn floor_div(numerator: i64, divisor: i64) -> i64 {
    if divisor <= 0 {
        return 0;
    }
    numerator.div_euclid(divisor)
}

/// Ceiling division for a positive divisor. Returns 0 when the divisor is not positive.
#[must_use]
pub const fn ceil_div(numerator: i64, divisor: i64) -> i64 {
    if divisor <= 0 {
        return 0;
    }
    let quotient = numerator.div_euclid(divisor);
    if numerator.rem_euclid(divisor) == 0 {
        quotient
    } else {
        quotient + 1
    }
}

/// Apply a percentage modifier, rounding down: `floor(value * (100 + percent) / 100)`.
#[must_use]
pub const fn scale_by_percent(value: i64, percent: i32) -> i64 {
    floor_div(value.saturating_mul(100 + percent as i64), 100)
}

/// Ceil a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn ceil_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).ceil();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Floor a f64 and clamp it to the i64 range, returning 0 for non-finite values.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Narrow an i64 into u32, saturating at the bounds.
#[must_use]
pub fn saturate_to_u32(value: i64) -> u32 {
    if value <= 0 {
        return 0;
    }
    cast::<i64, u32>(value).unwrap_or(u32::MAX)
}

/// Narrow an i64 into i32, saturating at the bounds.
#[must_use]
pub fn saturate_to_i32(value: i64) -> i32 {
    let clamped = value.clamp(i64::from(i32::MIN), i64::from(i32::MAX));
    cast::<i64, i32>(clamped).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn division_rounds_in_the_requested_direction() {
        assert_eq!(floor_div(2970, 100), 29);
        assert_eq!(ceil_div(1000, 110), 10);
        assert_eq!(ceil_div(1100, 110), 10);
        assert_eq!(ceil_div(1101, 110), 11);
        assert_eq!(floor_div(-1, 100), -1);
    }

    #[test]
    fn non_positive_divisors_yield_zero() {
        assert_eq!(floor_div(10, 0), 0);
        assert_eq!(ceil_div(10, -3), 0);
    }

    #[test]
    fn percent_scaling_truncates_down() {
        assert_eq!(scale_by_percent(27, 0), 27);
        assert_eq!(scale_by_percent(27, 10), 29);
        assert_eq!(scale_by_percent(25, 20), 30);
        assert_eq!(scale_by_percent(i64::MAX, i32::MAX), i64::MAX / 100);
        assert_eq!(scale_by_percent(27, i32::MIN), -579_820_558);
    }

    #[test]
    fn float_rounding_clamps_and_handles_nan() {
        assert_eq!(ceil_f64_to_i64(1.2), 2);
        assert_eq!(ceil_f64_to_i64(f64::NAN), 0);
        assert_eq!(floor_f64_to_i64(2.9), 2);
        assert_eq!(floor_f64_to_i64(f64::INFINITY), 0);
    }

    #[test]
    fn saturating_narrowing() {
        assert_eq!(saturate_to_u32(-5), 0);
        assert_eq!(saturate_to_u32(i64::from(u32::MAX) + 1), u32::MAX);
        assert_eq!(saturate_to_i32(i64::MAX), i32::MAX);
    }
}
