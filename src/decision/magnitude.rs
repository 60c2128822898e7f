//! Converts a qualitative action into an exact, bounded numeric change.
//!
//! Three fixed tiers bound every adjustment. Tier selection depends on
//! short-term momentum, trend consistency and rank; the mapping is the
//! mirror image for decreases. The result is the unclamped
//! multiplicative change; floors and portfolio rebalancing are the
//! executor's concern.

use crate::config::TierConfig;
use crate::core::math::round2;
use crate::core::types::{BidAction, BudgetAction, Magnitude, Tier, TrendConsistency};

/// Rank at or above which a top performer qualifies for the high
/// increase tier.
const TOP_RANK_CUTOFF: usize = 10;

/// Metrics consulted when picking a tier.
#[derive(Debug, Clone, Copy)]
pub struct MagnitudeInputs {
    /// Short-term momentum, percent.
    pub momentum: f64,
    pub consistency: TrendConsistency,
    /// 1-based rank within the period snapshot.
    pub rank: usize,
    pub snapshot_size: usize,
}

/// Exact budget change for a campaign action.
pub fn budget_change(
    action: BudgetAction,
    current: f64,
    inputs: &MagnitudeInputs,
    tiers: &TierConfig,
) -> Magnitude {
    match action {
        BudgetAction::Increase => directional_change(true, current, inputs, tiers),
        BudgetAction::Decrease => directional_change(false, current, inputs, tiers),
        BudgetAction::NoChange => no_change(current),
    }
}

/// Exact bid change for an ad-group action.
pub fn bid_change(
    action: BidAction,
    current: f64,
    inputs: &MagnitudeInputs,
    tiers: &TierConfig,
) -> Magnitude {
    match action {
        BidAction::RaiseBid => directional_change(true, current, inputs, tiers),
        BidAction::LowerBid => directional_change(false, current, inputs, tiers),
        BidAction::NoChange => no_change(current),
    }
}

/// The no-op magnitude: tier `None`, value unchanged, zero deltas.
pub fn no_change(current: f64) -> Magnitude {
    Magnitude {
        current: round2(current),
        new: round2(current),
        change_amount: 0.0,
        change_percent: 0.0,
        tier: Tier::None,
    }
}

fn directional_change(up: bool, current: f64, inputs: &MagnitudeInputs, tiers: &TierConfig) -> Magnitude {
    let tier = if up { increase_tier(inputs) } else { decrease_tier(inputs) };
    let pct = match tier {
        Tier::High => tiers.high_pct,
        Tier::Moderate => tiers.moderate_pct,
        _ => tiers.low_pct,
    };
    let multiplier = if up { 1.0 + pct / 100.0 } else { 1.0 - pct / 100.0 };
    let new = current * multiplier;
    Magnitude {
        current: round2(current),
        new: round2(new),
        change_amount: round2(new - current),
        change_percent: round2((multiplier - 1.0) * 100.0),
        tier,
    }
}

/// Tier for the increase path: strong sustained growth or a top
/// performer with momentum earns `High`; good growth earns
/// `Moderate`; everything else is the conservative `Low`.
fn increase_tier(m: &MagnitudeInputs) -> Tier {
    let consistent = m.consistency == TrendConsistency::ConsistentImproving;
    if (consistent && m.momentum >= 15.0) || (m.rank <= TOP_RANK_CUTOFF && m.momentum >= 10.0) {
        Tier::High
    } else if (consistent && m.momentum >= 5.0) || m.momentum >= 10.0 {
        Tier::Moderate
    } else {
        Tier::Low
    }
}

/// Mirror of [`increase_tier`], with the worst decile of the snapshot
/// standing in for the top-rank cutoff.
fn decrease_tier(m: &MagnitudeInputs) -> Tier {
    let consistent = m.consistency == TrendConsistency::ConsistentDeclining;
    let worst_decile = m.rank as f64 > m.snapshot_size as f64 * 0.9;
    if (consistent && m.momentum <= -15.0) || (worst_decile && m.momentum <= -10.0) {
        Tier::High
    } else if (consistent && m.momentum <= -5.0) || m.momentum <= -10.0 {
        Tier::Moderate
    } else {
        Tier::Low
    }
}
