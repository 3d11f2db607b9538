//! Numeric guards for scoring ratios.
//!
//! Attempt counts can be zero and response times come from client clocks, so
//! every ratio in the engine goes through these helpers instead of dividing
//! directly.

/// Check whether a slice contains NaN or Inf
pub fn has_invalid_values(arr: &[f64]) -> bool {
    arr.iter().any(|&x| x.is_nan() || x.is_infinite())
}

/// Clamp into [0, 1]; non-finite values become 0
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Clamp into [min, max]; non-finite values become `min`
pub fn clamp_range(x: f64, min: f64, max: f64) -> f64 {
    if x.is_finite() {
        x.clamp(min, max)
    } else {
        min
    }
}

/// Divide, returning `None` for a zero or non-finite denominator
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return None;
    }
    Some(numerator / denominator)
}

/// Durations reported by clients: NaN, Inf and negatives collapse to 0
pub fn sanitize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}
