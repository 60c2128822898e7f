//! The weekly optimization pipeline.
//!
//! One run is a pure transformation over a caller-supplied snapshot
//! plus history: enrich (trend + rank) -> decide (rule cascade) ->
//! apply (magnitude + rebalance + floors) -> roll over. The engine
//! owns no persistent state; repeated runs over the same inputs yield
//! identical results.

use std::collections::HashMap;

use anyhow::Result;
use tracing::info;

use crate::analytics::enrich::{
    enrich_ad_groups, enrich_audiences, enrich_campaigns, EnrichedAdGroup, EnrichedAudience,
    EnrichedCampaign,
};
use crate::analytics::portfolio::{summarize, PortfolioSummary};
use crate::config::PolicyConfig;
use crate::data::HistoryProvider;
use crate::decision::audience::{balance_distribution, decide_audiences};
use crate::decision::rules::{decide_ad_groups, decide_campaigns};
use crate::decision::types::DecisionSet;
use crate::error::EngineError;
use crate::execution::executor::{rollover, AdjustedWeek, Executor};

/// The analytics-enriched snapshot of one week, across all three
/// entity types, plus the portfolio summary.
#[derive(Debug, Clone)]
pub struct EnrichedState {
    pub week: u32,
    pub campaigns: Vec<EnrichedCampaign>,
    pub ad_groups: Vec<EnrichedAdGroup>,
    pub audiences: Vec<EnrichedAudience>,
    pub portfolio: PortfolioSummary,
}

/// Everything one weekly run produces.
#[derive(Debug, Clone)]
pub struct WeeklyRun {
    pub state: EnrichedState,
    pub decisions: DecisionSet,
    pub adjusted: AdjustedWeek,
    pub next_week: AdjustedWeek,
}

pub struct Optimizer {
    policy: PolicyConfig,
}

impl Optimizer {
    pub fn new(policy: PolicyConfig) -> Self {
        Self { policy }
    }

    /// Build the enriched state for `week` from the provider's
    /// history. Structural problems (no weeks, an empty snapshot for a
    /// required entity type) abort with a typed error.
    pub fn enrich(&self, provider: &dyn HistoryProvider, week: u32) -> Result<EnrichedState> {
        let campaigns_history = provider.campaigns_through(week)?;
        let ad_groups_history = provider.ad_groups_through(week)?;
        let audiences_history = provider.audiences_through(week)?;

        let campaigns = enrich_campaigns(&campaigns_history, week)?;
        let ad_groups = enrich_ad_groups(&ad_groups_history, week)?;
        let audiences = enrich_audiences(
            &audiences_history,
            week,
            self.policy.activate_percentile,
            self.policy.suppress_percentile,
        )?;
        let portfolio = summarize(&campaigns, week);

        info!(
            week,
            campaigns = campaigns.len(),
            ad_groups = ad_groups.len(),
            audiences = audiences.len(),
            "enriched period snapshot"
        );
        Ok(EnrichedState { week, campaigns, ad_groups, audiences, portfolio })
    }

    /// Produce the fully deterministic decision set for the state.
    pub fn recommend(&self, state: &EnrichedState) -> DecisionSet {
        DecisionSet {
            campaign_budget_actions: decide_campaigns(&state.campaigns, &self.policy),
            ad_group_bid_actions: decide_ad_groups(&state.ad_groups, &self.policy),
            audience_targeting_actions: decide_audiences(&state.audiences, &self.policy),
            explanation: None,
        }
    }

    /// Overlay advisor-supplied labels on the deterministic set.
    /// Budget actions stay deterministic; bid and audience labels are
    /// taken from the advisor when it supplied any. Advisor audience
    /// labels are joined back to the enriched health ranks and pass
    /// through the same distribution balancing as the deterministic
    /// path, so an overlaid week never escapes the per-side bounds.
    pub fn merge_with_advisor(
        &self,
        state: &EnrichedState,
        deterministic: DecisionSet,
        advisor: DecisionSet,
    ) -> DecisionSet {
        let audience_targeting_actions = if advisor.audience_targeting_actions.is_empty() {
            deterministic.audience_targeting_actions
        } else {
            let by_id: HashMap<&str, &EnrichedAudience> = state
                .audiences
                .iter()
                .map(|a| (a.row.audience_id.as_str(), a))
                .collect();
            let mut merged = advisor.audience_targeting_actions;
            for d in merged.iter_mut() {
                if let Some(a) = by_id.get(d.audience_id.as_str()) {
                    d.rank = a.health_rank;
                    d.health_score = a.composite_health_score;
                    if d.audience_name.is_empty() {
                        d.audience_name = a.row.audience_name.clone();
                    }
                }
            }
            balance_distribution(&mut merged, self.policy.min_per_side, self.policy.max_per_side);
            merged
        };
        DecisionSet {
            campaign_budget_actions: deterministic.campaign_budget_actions,
            ad_group_bid_actions: if advisor.ad_group_bid_actions.is_empty() {
                deterministic.ad_group_bid_actions
            } else {
                advisor.ad_group_bid_actions
            },
            audience_targeting_actions,
            explanation: advisor.explanation.or(deterministic.explanation),
        }
    }

    /// Apply a decision set to the enriched state and roll the result
    /// into next week's baseline.
    pub fn apply(&self, state: &EnrichedState, decisions: &DecisionSet) -> (AdjustedWeek, AdjustedWeek) {
        let executor = Executor::new(self.policy.clone());
        let adjusted = executor.apply(
            state.week,
            &state.campaigns,
            &state.ad_groups,
            &state.audiences,
            decisions,
        );
        let next = rollover(&adjusted);
        (adjusted, next)
    }

    /// Run the whole pipeline for the provider's latest week.
    pub fn run_latest(&self, provider: &dyn HistoryProvider) -> Result<WeeklyRun> {
        let week = provider.latest_week()?.ok_or(EngineError::NoHistory)?;
        self.run_week(provider, week)
    }

    /// Run the whole deterministic pipeline for one week.
    pub fn run_week(&self, provider: &dyn HistoryProvider, week: u32) -> Result<WeeklyRun> {
        let state = self.enrich(provider, week)?;
        let decisions = self.recommend(&state);
        let (adjusted, next_week) = self.apply(&state, &decisions);
        Ok(WeeklyRun { state, decisions, adjusted, next_week })
    }
}
