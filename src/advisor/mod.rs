//! Advisory-model boundary.
//!
//! The engine produces an analytics-enriched context ([`prompt`]),
//! an external qualitative-decision source consumes it ([`client`],
//! [`http`]) and the returned labels are parsed tolerantly here:
//! omitted entities become no-ops and unknown action labels are logged
//! anomalies, never coerced into a real action.

pub mod client;
pub mod http;
pub mod prompt;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::core::types::{AudienceAction, BidAction, BudgetAction};
use crate::decision::types::{AdGroupDecision, AudienceDecision, CampaignDecision, DecisionSet};

#[derive(Debug, Deserialize)]
struct RawDecisions {
    #[serde(default)]
    campaign_budget_actions: Vec<RawCampaignAction>,
    #[serde(default)]
    ad_group_bid_actions: Vec<RawAdGroupAction>,
    #[serde(default)]
    audience_targeting_actions: Vec<RawAudienceAction>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCampaignAction {
    campaign_id: u32,
    #[serde(rename = "type")]
    action: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct RawAdGroupAction {
    ad_group_id: u32,
    #[serde(rename = "type")]
    action: String,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct RawAudienceAction {
    audience_id: String,
    #[serde(rename = "type")]
    action: String,
    #[serde(default)]
    reason: String,
}

/// Parse the advisor's JSON reply into a [`DecisionSet`].
///
/// The advisor's text fields are carried for operators but never used
/// numerically. A label outside the known enumeration for its entity
/// type degrades to a no-op with a warning.
pub fn parse_decisions(raw: &str) -> Result<DecisionSet> {
    let trimmed = strip_code_fence(raw.trim());
    let parsed: RawDecisions =
        serde_json::from_str(trimmed).context("advisor did not return valid decision JSON")?;

    let campaign_budget_actions = parsed
        .campaign_budget_actions
        .into_iter()
        .map(|a| CampaignDecision {
            campaign_id: a.campaign_id,
            campaign_name: String::new(),
            action: parse_label::<BudgetAction>(&a.action, "campaign", BudgetAction::NoChange),
            reason: a.reason,
            roas: 0.0,
            rank: 0,
        })
        .collect();

    let ad_group_bid_actions = parsed
        .ad_group_bid_actions
        .into_iter()
        .map(|a| AdGroupDecision {
            ad_group_id: a.ad_group_id,
            action: parse_label::<BidAction>(&a.action, "ad_group", BidAction::NoChange),
            reason: a.reason,
            rank: 0,
        })
        .collect();

    let audience_targeting_actions = parsed
        .audience_targeting_actions
        .into_iter()
        .map(|a| AudienceDecision {
            audience_id: a.audience_id,
            audience_name: String::new(),
            action: parse_label::<AudienceAction>(&a.action, "audience", AudienceAction::NoChange),
            reason: a.reason,
            health_score: 0.0,
            rank: 0,
        })
        .collect();

    Ok(DecisionSet {
        campaign_budget_actions,
        ad_group_bid_actions,
        audience_targeting_actions,
        explanation: parsed.explanation,
    })
}

fn parse_label<T: serde::de::DeserializeOwned>(label: &str, entity: &str, fallback: T) -> T {
    match serde_json::from_value::<T>(serde_json::Value::String(label.to_string())) {
        Ok(action) => action,
        Err(_) => {
            warn!(entity, label, "unknown action label from advisor, treating as no-op");
            fallback
        }
    }
}

/// Models often wrap JSON in markdown fences; strip one layer if
/// present.
fn strip_code_fence(s: &str) -> &str {
    let s = s.strip_prefix("```json").or_else(|| s.strip_prefix("```")).unwrap_or(s);
    s.strip_suffix("```").unwrap_or(s).trim()
}
