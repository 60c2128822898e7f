//! Period-snapshot enrichment.
//!
//! For one week, every entity present in the snapshot receives exactly
//! one rank, one percentile and one trend record. Enrichment works on
//! copies; the historical series handed in is never modified.

use serde::Serialize;

use crate::analytics::ranking::{composite_health_score, optimal_action, rank_period};
use crate::analytics::trend::compute_trend;
use crate::core::math::{mean, median, round2};
use crate::core::types::{
    AdGroupRow, AudienceAction, AudienceRow, CampaignRow, TrendDirection, TrendRecord,
};
use crate::error::{EngineError, Result};

/// A campaign row plus its derived analytics for one week.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCampaign {
    #[serde(flatten)]
    pub row: CampaignRow,
    pub rank: usize,
    pub percentile: u8,
    #[serde(flatten)]
    pub trend: TrendRecord,
    pub distance_from_mean: f64,
    /// Rank within the same channel + model line, independent of the
    /// primary rank.
    pub category_rank: usize,
    pub weeks_above_median: usize,
}

/// An ad-group row plus its derived analytics for one week.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedAdGroup {
    #[serde(flatten)]
    pub row: AdGroupRow,
    pub rank: usize,
    pub percentile: u8,
    #[serde(flatten)]
    pub trend: TrendRecord,
    pub distance_from_mean: f64,
}

/// An audience row plus its health score, rank and trend signals.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedAudience {
    #[serde(flatten)]
    pub row: AudienceRow,
    pub composite_health_score: f64,
    pub health_rank: usize,
    pub health_percentile: u8,
    pub engagement_trend: TrendDirection,
    /// Direction of the fatigue metric itself; `Improving` here means
    /// fatigue is rising, which is bad for the audience.
    pub fatigue_trend: TrendDirection,
    pub optimal_action: AudienceAction,
}

fn metric_series<R>(history: &[R], week: u32, id_of: impl Fn(&R) -> bool, week_of: impl Fn(&R) -> u32, value_of: impl Fn(&R) -> f64) -> Vec<(u32, f64)> {
    let mut series: Vec<(u32, f64)> = history
        .iter()
        .filter(|r| id_of(r) && week_of(r) <= week)
        .map(|r| (week_of(r), value_of(r)))
        .collect();
    series.sort_by_key(|(w, _)| *w);
    series
}

/// Enrich the campaign snapshot for `week`, ranking by ROAS.
pub fn enrich_campaigns(history: &[CampaignRow], week: u32) -> Result<Vec<EnrichedCampaign>> {
    let snapshot: Vec<&CampaignRow> = history.iter().filter(|r| r.week == week).collect();
    if snapshot.is_empty() {
        return Err(EngineError::EmptySnapshot { entity: "campaign", week });
    }

    let pairs: Vec<(u32, f64)> = snapshot.iter().map(|r| (r.campaign_id, r.roas)).collect();
    let ranks = rank_period(&pairs);

    let roas_values: Vec<f64> = snapshot.iter().map(|r| r.roas).collect();
    let mean_roas = mean(&roas_values);
    let median_roas = median(&roas_values);

    let enriched = snapshot
        .iter()
        .map(|row| {
            let record = ranks[&row.campaign_id];
            let trend = compute_trend(&metric_series(
                history,
                week,
                |r| r.campaign_id == row.campaign_id,
                |r| r.week,
                |r| r.roas,
            ));

            // Secondary ranking pass over the channel + model-line
            // subset; it never alters the primary rank.
            let category: Vec<(u32, f64)> = snapshot
                .iter()
                .filter(|r| r.channel == row.channel && r.model_line == row.model_line)
                .map(|r| (r.campaign_id, r.roas))
                .collect();
            let category_rank = rank_period(&category)[&row.campaign_id].rank;

            let weeks_above_median = history
                .iter()
                .filter(|r| r.campaign_id == row.campaign_id && r.week <= week && r.roas > median_roas)
                .count();

            EnrichedCampaign {
                row: (*row).clone(),
                rank: record.rank,
                percentile: record.percentile,
                trend,
                distance_from_mean: round2(row.roas - mean_roas),
                category_rank,
                weeks_above_median,
            }
        })
        .collect();

    Ok(enriched)
}

/// Enrich the ad-group snapshot for `week`, ranking by ROAS.
pub fn enrich_ad_groups(history: &[AdGroupRow], week: u32) -> Result<Vec<EnrichedAdGroup>> {
    let snapshot: Vec<&AdGroupRow> = history.iter().filter(|r| r.week == week).collect();
    if snapshot.is_empty() {
        return Err(EngineError::EmptySnapshot { entity: "ad_group", week });
    }

    let pairs: Vec<(u32, f64)> = snapshot.iter().map(|r| (r.ad_group_id, r.roas)).collect();
    let ranks = rank_period(&pairs);
    let mean_roas = mean(&snapshot.iter().map(|r| r.roas).collect::<Vec<_>>());

    let enriched = snapshot
        .iter()
        .map(|row| {
            let record = ranks[&row.ad_group_id];
            let trend = compute_trend(&metric_series(
                history,
                week,
                |r| r.ad_group_id == row.ad_group_id,
                |r| r.week,
                |r| r.roas,
            ));
            EnrichedAdGroup {
                row: (*row).clone(),
                rank: record.rank,
                percentile: record.percentile,
                trend,
                distance_from_mean: round2(row.roas - mean_roas),
            }
        })
        .collect();

    Ok(enriched)
}

/// Enrich the audience snapshot for `week`, ranking by composite
/// health score.
pub fn enrich_audiences(
    history: &[AudienceRow],
    week: u32,
    activate_frac: f64,
    suppress_frac: f64,
) -> Result<Vec<EnrichedAudience>> {
    let snapshot: Vec<&AudienceRow> = history.iter().filter(|r| r.week == week).collect();
    if snapshot.is_empty() {
        return Err(EngineError::EmptySnapshot { entity: "audience", week });
    }
    let n = snapshot.len();

    let pairs: Vec<(String, f64)> = snapshot
        .iter()
        .map(|r| (r.audience_id.clone(), composite_health_score(r)))
        .collect();
    let ranks = rank_period(&pairs);

    let enriched = snapshot
        .iter()
        .map(|row| {
            let record = ranks[&row.audience_id];
            let engagement = compute_trend(&metric_series(
                history,
                week,
                |r| r.audience_id == row.audience_id,
                |r| r.week,
                |r| r.avg_ctr,
            ));
            let fatigue = compute_trend(&metric_series(
                history,
                week,
                |r| r.audience_id == row.audience_id,
                |r| r.week,
                |r| r.fatigue_score,
            ));
            EnrichedAudience {
                row: (*row).clone(),
                composite_health_score: composite_health_score(row),
                health_rank: record.rank,
                health_percentile: record.percentile,
                engagement_trend: engagement.direction,
                fatigue_trend: fatigue.direction,
                optimal_action: optimal_action(record.rank, n, activate_frac, suppress_frac),
            }
        })
        .collect();

    Ok(enriched)
}
