//! Decision records exchanged between the rule cascade, the advisory
//! model and the executor.
//!
//! A decision carries a qualitative action plus a human-facing reason.
//! Reasons are generated text for operators; they carry no decision
//! semantics and are never parsed back.

use serde::{Deserialize, Serialize};

use crate::core::types::{AudienceAction, BidAction, BudgetAction, Magnitude};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDecision {
    pub campaign_id: u32,
    pub campaign_name: String,
    #[serde(rename = "type")]
    pub action: BudgetAction,
    pub reason: String,
    pub roas: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdGroupDecision {
    pub ad_group_id: u32,
    #[serde(rename = "type")]
    pub action: BidAction,
    pub reason: String,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudienceDecision {
    pub audience_id: String,
    pub audience_name: String,
    #[serde(rename = "type")]
    pub action: AudienceAction,
    pub reason: String,
    pub health_score: f64,
    pub rank: usize,
}

/// The full qualitative decision set for one week.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionSet {
    #[serde(default)]
    pub campaign_budget_actions: Vec<CampaignDecision>,
    #[serde(default)]
    pub ad_group_bid_actions: Vec<AdGroupDecision>,
    #[serde(default)]
    pub audience_targeting_actions: Vec<AudienceDecision>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// A budget decision paired with its exact numeric change.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetAdjustment {
    pub campaign_id: u32,
    #[serde(rename = "type")]
    pub action: BudgetAction,
    pub magnitude: Magnitude,
    pub reason: String,
}

/// A bid decision paired with its exact numeric change.
#[derive(Debug, Clone, Serialize)]
pub struct BidAdjustment {
    pub ad_group_id: u32,
    #[serde(rename = "type")]
    pub action: BidAction,
    pub magnitude: Magnitude,
    pub reason: String,
}
