//! The deterministic action cascade for campaigns and ad groups.
//!
//! The cascade is an ordered list of named rules evaluated top-down;
//! the first rule that returns a lean wins and no later rule is
//! re-evaluated. Keeping the rules as data makes their order and
//! precedence explicit and lets each rule be tested on its own.

use crate::analytics::enrich::{EnrichedAdGroup, EnrichedCampaign};
use crate::analytics::ranking::{rank_tier, RankTier};
use crate::config::PolicyConfig;
use crate::core::types::{BidAction, BudgetAction, TrendDirection, TrendRecord};
use crate::decision::types::{AdGroupDecision, CampaignDecision};

/// Direction an entity's numeric field should move, before the entity
/// type maps it onto a concrete action label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lean {
    Up,
    Down,
    Hold,
}

/// Everything a rule may look at for one entity.
pub struct RuleContext<'a> {
    pub rank: usize,
    pub snapshot_size: usize,
    pub trend: &'a TrendRecord,
    pub distance_from_mean: f64,
    pub period_mean: f64,
    pub policy: &'a PolicyConfig,
}

/// A named predicate rule. Returns `None` when it does not apply.
pub struct Rule {
    pub name: &'static str,
    pub eval: fn(&RuleContext) -> Option<(Lean, String)>,
}

/// The cascade, in precedence order.
pub const CASCADE: &[Rule] = &[
    Rule { name: "momentum_override", eval: momentum_override },
    Rule { name: "top_tier", eval: top_tier },
    Rule { name: "bottom_tier", eval: bottom_tier },
    Rule { name: "weak_middle", eval: weak_middle },
    Rule { name: "middle_momentum", eval: middle_momentum },
];

/// Evaluate the cascade for one entity. Falls back to a hold with a
/// generic reason when no rule fires.
pub fn determine_lean(ctx: &RuleContext) -> (Lean, String) {
    for rule in CASCADE {
        if let Some((lean, reason)) = (rule.eval)(ctx) {
            return (lean, reason);
        }
    }
    (Lean::Hold, "Balanced performance across rank, trend and momentum signals".to_string())
}

/// 3-week momentum beyond the override band forces the maximal
/// directional action regardless of rank tier.
fn momentum_override(ctx: &RuleContext) -> Option<(Lean, String)> {
    let m3 = ctx.trend.momentum_3week;
    let band = ctx.policy.momentum_override_pct;
    if m3 > band {
        Some((
            Lean::Up,
            format!("Sustained 3-week momentum of {m3:+.1}% outpaces the portfolio; scaling into strength"),
        ))
    } else if m3 < -band {
        Some((
            Lean::Down,
            format!("Sustained 3-week erosion of {m3:+.1}%; pulling back before further decay"),
        ))
    } else {
        None
    }
}

fn tier_of(ctx: &RuleContext) -> RankTier {
    rank_tier(ctx.rank, ctx.snapshot_size, ctx.policy.top_percentile, ctx.policy.bottom_percentile)
}

/// Top tier leans positive unless the trend is already declining.
fn top_tier(ctx: &RuleContext) -> Option<(Lean, String)> {
    if tier_of(ctx) != RankTier::Top {
        return None;
    }
    if ctx.trend.direction == TrendDirection::Declining {
        Some((
            Lean::Hold,
            format!(
                "Rank #{}/{} remains premium but the trend has turned; holding while the decline is confirmed",
                ctx.rank, ctx.snapshot_size
            ),
        ))
    } else {
        let shape = match ctx.trend.direction {
            TrendDirection::Improving => "still climbing",
            _ => "holding steady",
        };
        Some((
            Lean::Up,
            format!(
                "Rank #{}/{} and {}; reinforcing a proven performer",
                ctx.rank, ctx.snapshot_size, shape
            ),
        ))
    }
}

/// Bottom tier leans negative unless a recovery is already under way.
fn bottom_tier(ctx: &RuleContext) -> Option<(Lean, String)> {
    if tier_of(ctx) != RankTier::Bottom {
        return None;
    }
    if ctx.trend.direction == TrendDirection::Improving
        && ctx.trend.momentum_1week > ctx.policy.hold_momentum_band_pct
    {
        Some((
            Lean::Hold,
            format!(
                "Rank #{}/{} is weak but momentum of {:+.1}% signals recovery; holding pending confirmation",
                ctx.rank, ctx.snapshot_size, ctx.trend.momentum_1week
            ),
        ))
    } else {
        Some((
            Lean::Down,
            format!(
                "Rank #{}/{} trails the portfolio with no recovery signal; reallocating away",
                ctx.rank, ctx.snapshot_size
            ),
        ))
    }
}

/// Middle tier with weak signals holds: momentum inside the band and
/// performance close to the period mean.
fn weak_middle(ctx: &RuleContext) -> Option<(Lean, String)> {
    if tier_of(ctx) != RankTier::Middle {
        return None;
    }
    let band = ctx.policy.hold_momentum_band_pct;
    let near_mean = ctx.distance_from_mean.abs() <= ctx.policy.hold_distance_frac * ctx.period_mean.abs();
    if ctx.trend.momentum_1week.abs() <= band && near_mean {
        Some((
            Lean::Hold,
            format!(
                "Mid-pack rank #{}/{} within {:+.1}% momentum and close to the period mean; no action warranted",
                ctx.rank, ctx.snapshot_size, ctx.trend.momentum_1week
            ),
        ))
    } else {
        None
    }
}

/// Middle tier otherwise follows the short-term momentum sign.
fn middle_momentum(ctx: &RuleContext) -> Option<(Lean, String)> {
    if tier_of(ctx) != RankTier::Middle {
        return None;
    }
    let m1 = ctx.trend.momentum_1week;
    let band = ctx.policy.hold_momentum_band_pct;
    if m1 > band {
        Some((
            Lean::Up,
            format!("Mid-pack rank #{} with emerging strength ({m1:+.1}% momentum); leaning in", ctx.rank),
        ))
    } else if m1 < -band {
        Some((
            Lean::Down,
            format!("Mid-pack rank #{} softening ({m1:+.1}% momentum); trimming exposure", ctx.rank),
        ))
    } else {
        None
    }
}

/// Run the cascade over the enriched campaign snapshot.
pub fn decide_campaigns(campaigns: &[EnrichedCampaign], policy: &PolicyConfig) -> Vec<CampaignDecision> {
    let n = campaigns.len();
    let period_mean = crate::core::math::mean(&campaigns.iter().map(|c| c.row.roas).collect::<Vec<_>>());
    campaigns
        .iter()
        .map(|c| {
            let (lean, reason) = determine_lean(&RuleContext {
                rank: c.rank,
                snapshot_size: n,
                trend: &c.trend,
                distance_from_mean: c.distance_from_mean,
                period_mean,
                policy,
            });
            let action = match lean {
                Lean::Up => BudgetAction::Increase,
                Lean::Down => BudgetAction::Decrease,
                Lean::Hold => BudgetAction::NoChange,
            };
            CampaignDecision {
                campaign_id: c.row.campaign_id,
                campaign_name: c.row.campaign_name.clone(),
                action,
                reason,
                roas: c.row.roas,
                rank: c.rank,
            }
        })
        .collect()
}

/// Run the cascade over the enriched ad-group snapshot.
pub fn decide_ad_groups(ad_groups: &[EnrichedAdGroup], policy: &PolicyConfig) -> Vec<AdGroupDecision> {
    let n = ad_groups.len();
    let period_mean = crate::core::math::mean(&ad_groups.iter().map(|g| g.row.roas).collect::<Vec<_>>());
    ad_groups
        .iter()
        .map(|g| {
            let (lean, reason) = determine_lean(&RuleContext {
                rank: g.rank,
                snapshot_size: n,
                trend: &g.trend,
                distance_from_mean: g.distance_from_mean,
                period_mean,
                policy,
            });
            let action = match lean {
                Lean::Up => BidAction::RaiseBid,
                Lean::Down => BidAction::LowerBid,
                Lean::Hold => BidAction::NoChange,
            };
            AdGroupDecision { ad_group_id: g.row.ad_group_id, action, reason, rank: g.rank }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{TrendConsistency, TrendDirection};

    fn trend(m1: f64, m3: f64, direction: TrendDirection) -> TrendRecord {
        TrendRecord {
            direction,
            momentum_1week: m1,
            momentum_3week: m3,
            avg_3week: 0.0,
            volatility: 0.0,
            consistency: TrendConsistency::Volatile,
        }
    }

    fn ctx<'a>(rank: usize, trend: &'a TrendRecord, distance: f64, policy: &'a PolicyConfig) -> RuleContext<'a> {
        RuleContext {
            rank,
            snapshot_size: 10,
            trend,
            distance_from_mean: distance,
            period_mean: 100.0,
            policy,
        }
    }

    #[test]
    fn momentum_override_beats_rank_tier() {
        let policy = PolicyConfig::default();
        // Bottom-tier rank, but a +20% 3-week move forces the positive action.
        let t = trend(2.0, 20.0, TrendDirection::Improving);
        let (lean, _) = determine_lean(&ctx(10, &t, -40.0, &policy));
        assert_eq!(lean, Lean::Up);
    }

    #[test]
    fn top_tier_holds_when_declining() {
        let policy = PolicyConfig::default();
        let t = trend(-3.0, -4.0, TrendDirection::Declining);
        let (lean, _) = determine_lean(&ctx(1, &t, 30.0, &policy));
        assert_eq!(lean, Lean::Hold);

        let t = trend(3.0, 4.0, TrendDirection::Stable);
        let (lean, _) = determine_lean(&ctx(1, &t, 30.0, &policy));
        assert_eq!(lean, Lean::Up);
    }

    #[test]
    fn bottom_tier_holds_on_confirmed_recovery_only() {
        let policy = PolicyConfig::default();
        let recovering = trend(8.0, 9.0, TrendDirection::Improving);
        let (lean, _) = determine_lean(&ctx(9, &recovering, -35.0, &policy));
        assert_eq!(lean, Lean::Hold);

        let faint = trend(3.0, 4.0, TrendDirection::Improving);
        let (lean, _) = determine_lean(&ctx(9, &faint, -35.0, &policy));
        assert_eq!(lean, Lean::Down);
    }

    #[test]
    fn weak_middle_holds_near_the_mean() {
        let policy = PolicyConfig::default();
        let t = trend(2.0, 3.0, TrendDirection::Stable);
        let (lean, reason) = determine_lean(&ctx(5, &t, 4.0, &policy));
        assert_eq!(lean, Lean::Hold);
        assert!(reason.contains("Mid-pack"));
    }

    #[test]
    fn middle_follows_momentum_when_signals_are_strong() {
        let policy = PolicyConfig::default();
        let up = trend(7.0, 6.0, TrendDirection::Improving);
        let (lean, _) = determine_lean(&ctx(5, &up, 20.0, &policy));
        assert_eq!(lean, Lean::Up);

        let down = trend(-7.0, -6.0, TrendDirection::Declining);
        let (lean, _) = determine_lean(&ctx(5, &down, -20.0, &policy));
        assert_eq!(lean, Lean::Down);
    }

    #[test]
    fn middle_far_from_mean_but_flat_momentum_falls_through() {
        let policy = PolicyConfig::default();
        // Far from the mean disables the weak-middle hold, yet momentum
        // inside the band gives middle_momentum nothing to act on.
        let t = trend(1.0, 2.0, TrendDirection::Stable);
        let (lean, reason) = determine_lean(&ctx(5, &t, 60.0, &policy));
        assert_eq!(lean, Lean::Hold);
        assert!(reason.contains("Balanced performance"));
    }

    #[test]
    fn cascade_is_deterministic() {
        let policy = PolicyConfig::default();
        let t = trend(6.0, 7.0, TrendDirection::Improving);
        let a = determine_lean(&ctx(5, &t, 12.0, &policy));
        let b = determine_lean(&ctx(5, &t, 12.0, &policy));
        assert_eq!(a.0, b.0);
        assert_eq!(a.1, b.1);
    }
}
