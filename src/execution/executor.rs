//! Applies a qualitative decision set to the current week's rows.
//!
//! The executor is the point where actions become numbers: each label
//! goes through the magnitude calculator, campaign budgets are then
//! rebalanced back to the pre-adjustment total, and per-entity floors
//! are applied last. Everything returns new rows; the historical
//! series handed to the engine is never touched.

use std::collections::HashMap;

use tracing::debug;

use crate::analytics::enrich::{EnrichedAdGroup, EnrichedAudience, EnrichedCampaign};
use crate::config::PolicyConfig;
use crate::core::math::round2;
use crate::core::types::{
    AdGroupRow, AudienceAction, AudienceRow, BidAction, BudgetAction, CampaignRow,
};
use crate::decision::magnitude::{bid_change, budget_change, MagnitudeInputs};
use crate::decision::types::{BidAdjustment, BudgetAdjustment, DecisionSet};
use crate::execution::rebalance::{apply_floor, rebalance_rounded};

/// The current week's rows after all adjustments, plus the exact
/// numeric change applied per entity.
#[derive(Debug, Clone)]
pub struct AdjustedWeek {
    pub week: u32,
    pub campaigns: Vec<CampaignRow>,
    pub ad_groups: Vec<AdGroupRow>,
    pub audiences: Vec<AudienceRow>,
    pub budget_adjustments: Vec<BudgetAdjustment>,
    pub bid_adjustments: Vec<BidAdjustment>,
}

pub struct Executor {
    policy: PolicyConfig,
}

impl Executor {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Apply a decision set to the enriched snapshot. Entities without
    /// a decision entry are treated as no-ops.
    pub fn apply(
        &self,
        week: u32,
        campaigns: &[EnrichedCampaign],
        ad_groups: &[EnrichedAdGroup],
        audiences: &[EnrichedAudience],
        decisions: &DecisionSet,
    ) -> AdjustedWeek {
        let (campaign_rows, budget_adjustments) = self.apply_budgets(campaigns, decisions);
        let (ad_group_rows, bid_adjustments) = self.apply_bids(ad_groups, decisions);
        let audience_rows = self.apply_audiences(audiences, decisions);
        AdjustedWeek {
            week,
            campaigns: campaign_rows,
            ad_groups: ad_group_rows,
            audiences: audience_rows,
            budget_adjustments,
            bid_adjustments,
        }
    }

    fn apply_budgets(
        &self,
        campaigns: &[EnrichedCampaign],
        decisions: &DecisionSet,
    ) -> (Vec<CampaignRow>, Vec<BudgetAdjustment>) {
        let by_id: HashMap<u32, BudgetAction> = decisions
            .campaign_budget_actions
            .iter()
            .map(|d| (d.campaign_id, d.action))
            .collect();
        let reasons: HashMap<u32, &str> = decisions
            .campaign_budget_actions
            .iter()
            .map(|d| (d.campaign_id, d.reason.as_str()))
            .collect();

        let target_total: f64 = campaigns.iter().map(|c| c.row.weekly_budget_allocated).sum();
        let n = campaigns.len();

        let mut rows: Vec<CampaignRow> = Vec::with_capacity(n);
        let mut adjustments = Vec::with_capacity(n);
        let mut budgets = Vec::with_capacity(n);
        for c in campaigns {
            let action = by_id.get(&c.row.campaign_id).copied().unwrap_or_else(|| {
                debug!(campaign = c.row.campaign_id, "no budget decision supplied, holding");
                BudgetAction::NoChange
            });
            let magnitude = budget_change(
                action,
                c.row.weekly_budget_allocated,
                &MagnitudeInputs {
                    momentum: c.trend.momentum_3week,
                    consistency: c.trend.consistency,
                    rank: c.rank,
                    snapshot_size: n,
                },
                &self.policy.tiers,
            );
            budgets.push(magnitude.new);
            adjustments.push(BudgetAdjustment {
                campaign_id: c.row.campaign_id,
                action,
                magnitude,
                reason: reasons.get(&c.row.campaign_id).unwrap_or(&"").to_string(),
            });
            rows.push(c.row.clone());
        }

        // Neutrality: the portfolio total is unchanged by the week's
        // adjustments. Floors come afterwards and may bind.
        rebalance_rounded(&mut budgets, target_total);
        apply_floor(&mut budgets, self.policy.min_budget);
        for (row, budget) in rows.iter_mut().zip(budgets) {
            row.weekly_budget_allocated = budget;
        }

        (rows, adjustments)
    }

    fn apply_bids(
        &self,
        ad_groups: &[EnrichedAdGroup],
        decisions: &DecisionSet,
    ) -> (Vec<AdGroupRow>, Vec<BidAdjustment>) {
        let by_id: HashMap<u32, BidAction> =
            decisions.ad_group_bid_actions.iter().map(|d| (d.ad_group_id, d.action)).collect();
        let reasons: HashMap<u32, &str> =
            decisions.ad_group_bid_actions.iter().map(|d| (d.ad_group_id, d.reason.as_str())).collect();
        let n = ad_groups.len();

        let mut rows = Vec::with_capacity(n);
        let mut adjustments = Vec::with_capacity(n);
        for g in ad_groups {
            let action = by_id.get(&g.row.ad_group_id).copied().unwrap_or_else(|| {
                debug!(ad_group = g.row.ad_group_id, "no bid decision supplied, holding");
                BidAction::NoChange
            });
            let magnitude = bid_change(
                action,
                g.row.avg_bid,
                &MagnitudeInputs {
                    momentum: g.trend.momentum_3week,
                    consistency: g.trend.consistency,
                    rank: g.rank,
                    snapshot_size: n,
                },
                &self.policy.tiers,
            );
            let mut row = g.row.clone();
            row.avg_bid = magnitude.new.max(self.policy.min_bid);
            adjustments.push(BidAdjustment {
                ad_group_id: g.row.ad_group_id,
                action,
                magnitude,
                reason: reasons.get(&g.row.ad_group_id).unwrap_or(&"").to_string(),
            });
            rows.push(row);
        }
        (rows, adjustments)
    }

    fn apply_audiences(&self, audiences: &[EnrichedAudience], decisions: &DecisionSet) -> Vec<AudienceRow> {
        let by_id: HashMap<&str, AudienceAction> = decisions
            .audience_targeting_actions
            .iter()
            .map(|d| (d.audience_id.as_str(), d.action))
            .collect();
        audiences
            .iter()
            .map(|a| {
                let mut row = a.row.clone();
                row.is_suppressed = matches!(
                    by_id.get(a.row.audience_id.as_str()),
                    Some(AudienceAction::Suppress)
                );
                row
            })
            .collect()
    }
}

/// Produce next week's rows from the adjusted snapshot: structural
/// fields and the adjusted budgets/bids carry over, performance
/// metrics reset to zero until the platform reports them.
pub fn rollover(adjusted: &AdjustedWeek) -> AdjustedWeek {
    let next_week = adjusted.week + 1;
    let campaigns = adjusted
        .campaigns
        .iter()
        .map(|c| CampaignRow {
            week: next_week,
            weekly_budget_spent: 0.0,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            conversion_value: 0.0,
            roas: 0.0,
            ctr: 0.0,
            cvr: 0.0,
            ..c.clone()
        })
        .collect();
    let ad_groups = adjusted
        .ad_groups
        .iter()
        .map(|g| AdGroupRow {
            week: next_week,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            roas: 0.0,
            ctr: 0.0,
            cvr: 0.0,
            ..g.clone()
        })
        .collect();
    let audiences = adjusted
        .audiences
        .iter()
        .map(|a| AudienceRow { week: next_week, ..a.clone() })
        .collect();

    AdjustedWeek {
        week: next_week,
        campaigns,
        ad_groups,
        audiences,
        budget_adjustments: Vec::new(),
        bid_adjustments: Vec::new(),
    }
}

/// Convenience used by reports: total allocated budget of a snapshot,
/// rounded to cents.
pub fn total_budget(campaigns: &[CampaignRow]) -> f64 {
    round2(campaigns.iter().map(|c| c.weekly_budget_allocated).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::enrich::{enrich_ad_groups, enrich_campaigns};
    use crate::decision::rules::{decide_ad_groups, decide_campaigns};
    use crate::decision::types::CampaignDecision;

    fn campaign(id: u32, week: u32, roas: f64, budget: f64) -> CampaignRow {
        CampaignRow {
            campaign_id: id,
            campaign_name: format!("Campaign {id}"),
            channel: "search".into(),
            model_line: "suv".into(),
            week,
            weekly_budget_allocated: budget,
            weekly_budget_spent: budget * 0.9,
            impressions: 20_000,
            clicks: 600,
            conversions: 60,
            conversion_value: budget * roas,
            roas,
            ctr: 0.03,
            cvr: 0.1,
        }
    }

    fn ad_group(id: u32, week: u32, roas: f64, bid: f64) -> AdGroupRow {
        AdGroupRow {
            ad_group_id: id,
            campaign_id: 1,
            ad_group_name: format!("Ad group {id}"),
            week,
            avg_bid: bid,
            impressions: 5_000,
            clicks: 150,
            conversions: 12,
            roas,
            ctr: 0.03,
            cvr: 0.08,
        }
    }

    fn campaign_history() -> Vec<CampaignRow> {
        let mut rows = Vec::new();
        let series: [(u32, [f64; 3], f64); 4] = [
            (1, [50.0, 55.0, 66.0], 1000.0),
            (2, [80.0, 78.0, 75.0], 800.0),
            (3, [60.0, 60.0, 61.0], 600.0),
            (4, [90.0, 70.0, 50.0], 400.0),
        ];
        for (id, roas, budget) in series {
            for (i, r) in roas.iter().enumerate() {
                rows.push(campaign(id, i as u32 + 1, *r, budget));
            }
        }
        rows
    }

    #[test]
    fn budget_total_is_preserved_after_apply() {
        let history = campaign_history();
        let policy = PolicyConfig::default();
        let campaigns = enrich_campaigns(&history, 3).unwrap();
        let decisions = DecisionSet {
            campaign_budget_actions: decide_campaigns(&campaigns, &policy),
            ..Default::default()
        };
        let executor = Executor::new(policy);
        let adjusted = executor.apply(3, &campaigns, &[], &[], &decisions);

        let before: f64 = campaigns.iter().map(|c| c.row.weekly_budget_allocated).sum();
        let after: f64 = adjusted.campaigns.iter().map(|c| c.weekly_budget_allocated).sum();
        assert!((after - before).abs() <= 0.02 * adjusted.campaigns.len() as f64);
    }

    #[test]
    fn omitted_entities_are_noops() {
        let history = campaign_history();
        let policy = PolicyConfig::default();
        let campaigns = enrich_campaigns(&history, 3).unwrap();
        // Only campaign 1 receives a label; the rest must hold.
        let decisions = DecisionSet {
            campaign_budget_actions: vec![CampaignDecision {
                campaign_id: 1,
                campaign_name: "Campaign 1".into(),
                action: BudgetAction::Increase,
                reason: "scaling".into(),
                roas: 66.0,
                rank: 2,
            }],
            ..Default::default()
        };
        let executor = Executor::new(policy);
        let adjusted = executor.apply(3, &campaigns, &[], &[], &decisions);
        for adj in &adjusted.budget_adjustments {
            if adj.campaign_id == 1 {
                assert_eq!(adj.action, BudgetAction::Increase);
            } else {
                assert_eq!(adj.action, BudgetAction::NoChange);
                assert_eq!(adj.magnitude.change_amount, 0.0);
            }
        }
    }

    #[test]
    fn bid_floor_binds_after_magnitude() {
        let history = vec![
            ad_group(1, 1, 90.0, 0.6),
            ad_group(1, 2, 70.0, 0.6),
            ad_group(1, 3, 50.0, 0.6),
            ad_group(2, 3, 80.0, 2.0),
        ];
        let policy = PolicyConfig::default();
        let ad_groups = enrich_ad_groups(&history, 3).unwrap();
        let decisions = DecisionSet {
            ad_group_bid_actions: decide_ad_groups(&ad_groups, &policy),
            ..Default::default()
        };
        let executor = Executor::new(policy);
        let adjusted = executor.apply(3, &[], &ad_groups, &[], &decisions);
        let falling = adjusted.ad_groups.iter().find(|g| g.ad_group_id == 1).unwrap();
        // A 20% cut of 0.6 would be 0.48; the 0.5 floor binds.
        assert_eq!(falling.avg_bid, 0.5);
    }

    #[test]
    fn rollover_resets_performance_and_keeps_structure() {
        let history = campaign_history();
        let policy = PolicyConfig::default();
        let campaigns = enrich_campaigns(&history, 3).unwrap();
        let executor = Executor::new(policy);
        let adjusted = executor.apply(3, &campaigns, &[], &[], &DecisionSet::default());
        let next = rollover(&adjusted);
        assert_eq!(next.week, 4);
        for row in &next.campaigns {
            assert_eq!(row.roas, 0.0);
            assert_eq!(row.impressions, 0);
            assert!(row.weekly_budget_allocated > 0.0, "budget carries over");
        }
    }
}
