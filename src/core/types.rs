//! Core row and record types for the decision engine.
//!
//! A row is one entity's metrics for one week. Rows are immutable once
//! loaded; the analytics layer derives enriched copies and never writes
//! back into the historical series. All types are serialisable via
//! [`serde`] so they can cross the advisory-model and persistence
//! boundaries unchanged.

use serde::{Deserialize, Serialize};

/// One campaign's metrics for one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRow {
    pub campaign_id: u32,
    pub campaign_name: String,
    pub channel: String,
    pub model_line: String,
    pub week: u32,
    pub weekly_budget_allocated: f64,
    pub weekly_budget_spent: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub conversion_value: f64,
    pub roas: f64,
    pub ctr: f64,
    pub cvr: f64,
}

/// One ad group's metrics for one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdGroupRow {
    pub ad_group_id: u32,
    pub campaign_id: u32,
    pub ad_group_name: String,
    pub week: u32,
    pub avg_bid: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub roas: f64,
    pub ctr: f64,
    pub cvr: f64,
}

/// One audience's engagement metrics for one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudienceRow {
    pub audience_id: String,
    pub audience_name: String,
    pub week: u32,
    pub intent_score: f64,
    pub fatigue_score: f64,
    pub avg_ctr: f64,
    pub avg_cvr: f64,
    pub frequency: f64,
    /// Set by the executor when the audience is suppressed for the
    /// following week. Not part of the measured metrics.
    #[serde(default)]
    pub is_suppressed: bool,
}

/// Direction of a metric's trend over recent weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Whether successive week-over-week deltas share a sign across the
/// last three observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendConsistency {
    ConsistentImproving,
    ConsistentDeclining,
    Volatile,
    LimitedData,
    InsufficientData,
}

/// Per-entity, per-week trend analysis for a single metric. Derived
/// solely from the ordered historical series truncated at the current
/// week; identical input always yields identical output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub direction: TrendDirection,
    /// Percentage change versus the previous week.
    pub momentum_1week: f64,
    /// Percentage change versus three weeks back.
    pub momentum_3week: f64,
    /// Rolling average of the last up-to-three points.
    pub avg_3week: f64,
    /// Standard deviation of the last three points.
    pub volatility: f64,
    pub consistency: TrendConsistency,
}

/// Cross-sectional position of an entity within one period snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRecord {
    /// 1-based position in a stable descending sort over the metric.
    pub rank: usize,
    /// `round((1 - (rank - 1) / N) * 100)`; rank 1 maps to 100.
    pub percentile: u8,
}

/// Magnitude band for a numeric adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    None,
    Low,
    Moderate,
    High,
}

/// Exact numeric change produced for one entity. `tier` is `None` iff
/// the action was a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Magnitude {
    pub current: f64,
    pub new: f64,
    pub change_amount: f64,
    pub change_percent: f64,
    pub tier: Tier,
}

/// Qualitative action for a campaign budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAction {
    Increase,
    Decrease,
    NoChange,
}

/// Qualitative action for an ad-group bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidAction {
    RaiseBid,
    LowerBid,
    NoChange,
}

/// Qualitative action for an audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudienceAction {
    Activate,
    Suppress,
    NoChange,
}

impl BudgetAction {
    pub fn is_noop(self) -> bool {
        self == BudgetAction::NoChange
    }
}

impl BidAction {
    pub fn is_noop(self) -> bool {
        self == BidAction::NoChange
    }
}

impl AudienceAction {
    pub fn is_noop(self) -> bool {
        self == AudienceAction::NoChange
    }
}
