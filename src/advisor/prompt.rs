//! Builds the analytics-enriched context handed to the advisory model.
//!
//! The context is both human- and machine-readable: a portfolio
//! overview in prose followed by the enriched entities as JSON, plus
//! the expected output schema. Nothing the model returns is trusted
//! numerically; the engine only consumes the qualitative labels.

use anyhow::Result;

use crate::analytics::enrich::{EnrichedAdGroup, EnrichedAudience, EnrichedCampaign};
use crate::analytics::portfolio::{Mover, PortfolioSummary};

pub const SYSTEM_PROMPT: &str = "You are a marketing optimization advisor. You analyze campaign, \
bid and audience data and return ONLY valid JSON. Your decisions MUST be qualitative labels; \
never include numeric budgets or bids. No text outside JSON.";

/// Render the full user prompt for one week.
pub fn build_prompt(
    summary: &PortfolioSummary,
    campaigns: &[EnrichedCampaign],
    ad_groups: &[EnrichedAdGroup],
    audiences: &[EnrichedAudience],
) -> Result<String> {
    let state = serde_json::json!({
        "campaigns": campaigns,
        "ad_groups": ad_groups,
        "audiences": audiences,
    });

    Ok(format!(
        r#"{overview}

=== ENRICHED FIELDS ===
Each campaign/ad group carries: rank (1 = best), percentile, direction,
momentum_1week, momentum_3week, avg_3week, volatility, consistency and
distance_from_mean. Each audience carries: composite_health_score,
health_rank, health_percentile, engagement_trend, fatigue_trend and a
precomputed optimal_action.

=== GUIDELINES ===
- Use the rank tiers and momentum, not absolute metric thresholds.
- Strong positive momentum justifies raising bids even mid-rank; strong
  negative momentum justifies lowering them even for past winners.
- For audiences, start from optimal_action and soften it to no_change
  when the opposing trend disagrees (worsening fatigue vs activation,
  recovering engagement vs suppression).
- Provide one action per entity in the state; entities you omit are
  treated as no_change.

=== CURRENT STATE ===
{state}

=== OUTPUT FORMAT ===
{{
  "ad_group_bid_actions": [
    {{"ad_group_id": 0, "type": "raise_bid | lower_bid | no_change", "reason": "data-rich, 15-25 words"}}
  ],
  "audience_targeting_actions": [
    {{"audience_id": "AUD1", "type": "activate | suppress | no_change", "reason": "data-rich, 15-25 words"}}
  ],
  "explanation": "2-3 sentence strategic summary for week {week}"
}}"#,
        overview = render_overview(summary),
        state = serde_json::to_string_pretty(&state)?,
        week = summary.week,
    ))
}

fn render_overview(summary: &PortfolioSummary) -> String {
    format!(
        "PORTFOLIO OVERVIEW (week {week}):\n\
         - Campaigns: {total} (improving {imp}, declining {dec}, stable {stab})\n\
         - ROAS mean {mean:.2}, median {median:.2}, std {std:.2}\n\
         TOP MOVERS:\n{top}\n\
         BOTTOM MOVERS:\n{bottom}",
        week = summary.week,
        total = summary.total_campaigns,
        imp = summary.improving,
        dec = summary.declining,
        stab = summary.stable,
        mean = summary.roas_mean,
        median = summary.roas_median,
        std = summary.roas_std,
        top = render_movers(&summary.top_movers),
        bottom = render_movers(&summary.bottom_movers),
    )
}

fn render_movers(movers: &[Mover]) -> String {
    if movers.is_empty() {
        return "  none".to_string();
    }
    movers
        .iter()
        .map(|m| {
            format!(
                "  - {} (id {}): {:+.1}% change, current ROAS {:.2}",
                m.campaign_name, m.campaign_id, m.change, m.current_roas
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
