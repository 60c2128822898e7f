//! Portfolio-level budget neutrality.
//!
//! After every per-entity adjustment has been decided, the portfolio
//! total is restored by uniform proportional scaling. This is the only
//! aggregation point in the pipeline: it must run after all magnitude
//! decisions and before any per-entity floor, because floors do not
//! preserve the global total.

use tracing::warn;

use crate::core::math::round2;

/// Scale every value by `target_total / current_total` so the sum is
/// exactly preserved within floating-point tolerance. A zero current
/// total would divide by zero; the call degrades to a warned no-op.
pub fn rebalance(values: &mut [f64], target_total: f64) {
    let current_total: f64 = values.iter().sum();
    if current_total == 0.0 {
        warn!(target_total, "rebalance skipped: current total is zero");
        return;
    }
    let scale = target_total / current_total;
    for v in values.iter_mut() {
        *v *= scale;
    }
}

/// Rebalance and then round each value to cents. Rounding may move the
/// total off the target by a fraction of a cent per entity.
pub fn rebalance_rounded(values: &mut [f64], target_total: f64) {
    rebalance(values, target_total);
    for v in values.iter_mut() {
        *v = round2(*v);
    }
}

/// Per-entity floor, applied independently after rebalancing. Floors
/// deliberately break the global invariant when they bind.
pub fn apply_floor(values: &mut [f64], floor: f64) {
    for v in values.iter_mut() {
        if *v < floor {
            *v = floor;
        }
    }
}
