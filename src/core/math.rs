//! Numeric helpers shared by the analytics and decision layers.
//!
//! These functions operate on plain `f64` slices and deliberately avoid
//! any heavier numeric dependency. Momentum, rolling averages and the
//! two standard-deviation variants used by the trend calculator all
//! live here so their edge cases are tested in one place.

/// Percentage change from `previous` to `latest`, measured against the
/// magnitude of `previous`. Returns 0.0 when `previous` is zero.
pub fn momentum_pct(previous: f64, latest: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (latest - previous) / previous.abs() * 100.0
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of the values. Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Population standard deviation (divides by `n`). Returns 0.0 for
/// fewer than two values.
pub fn population_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Sample standard deviation (divides by `n - 1`). Returns 0.0 for
/// fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Round to the given number of decimal places.
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    let multiplier = 10_f64.powi(decimals as i32);
    (value * multiplier).round() / multiplier
}

/// Round to two decimal places, the precision used for budgets, bids
/// and reported momentum.
pub fn round2(value: f64) -> f64 {
    round_to_decimals(value, 2)
}

/// Check if two floating point numbers are approximately equal.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
