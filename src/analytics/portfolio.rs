//! Portfolio-level summary of one week's campaign snapshot.

use serde::Serialize;

use crate::analytics::enrich::EnrichedCampaign;
use crate::core::math::{mean, median, population_std, round2};
use crate::core::types::TrendDirection;

/// A campaign singled out for its week-over-week move.
#[derive(Debug, Clone, Serialize)]
pub struct Mover {
    pub campaign_id: u32,
    pub campaign_name: String,
    /// 1-week momentum, percent.
    pub change: f64,
    pub current_roas: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub week: u32,
    pub total_campaigns: usize,
    pub roas_mean: f64,
    pub roas_median: f64,
    pub roas_std: f64,
    pub top_movers: Vec<Mover>,
    pub bottom_movers: Vec<Mover>,
    pub improving: usize,
    pub declining: usize,
    pub stable: usize,
}

/// Summarise the enriched campaign snapshot. Movers are the largest
/// absolute 1-week moves among campaigns with nonzero momentum, at
/// most three per side.
pub fn summarize(campaigns: &[EnrichedCampaign], week: u32) -> PortfolioSummary {
    let roas_values: Vec<f64> = campaigns.iter().map(|c| c.row.roas).collect();

    let mut movers: Vec<Mover> = campaigns
        .iter()
        .filter(|c| c.trend.momentum_1week != 0.0)
        .map(|c| Mover {
            campaign_id: c.row.campaign_id,
            campaign_name: c.row.campaign_name.clone(),
            change: c.trend.momentum_1week,
            current_roas: c.row.roas,
        })
        .collect();
    movers.sort_by(|a, b| {
        b.change
            .abs()
            .partial_cmp(&a.change.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top_movers: Vec<Mover> = movers.iter().filter(|m| m.change > 0.0).take(3).cloned().collect();
    let bottom_movers: Vec<Mover> = movers.iter().filter(|m| m.change < 0.0).take(3).cloned().collect();

    let count_dir = |d: TrendDirection| campaigns.iter().filter(|c| c.trend.direction == d).count();

    PortfolioSummary {
        week,
        total_campaigns: campaigns.len(),
        roas_mean: round2(mean(&roas_values)),
        roas_median: round2(median(&roas_values)),
        roas_std: round2(population_std(&roas_values)),
        top_movers,
        bottom_movers,
        improving: count_dir(TrendDirection::Improving),
        declining: count_dir(TrendDirection::Declining),
        stable: count_dir(TrendDirection::Stable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::enrich::enrich_campaigns;
    use crate::core::types::CampaignRow;

    fn campaign(id: u32, week: u32, roas: f64) -> CampaignRow {
        CampaignRow {
            campaign_id: id,
            campaign_name: format!("Campaign {id}"),
            channel: "search".into(),
            model_line: "sedan".into(),
            week,
            weekly_budget_allocated: 500.0,
            weekly_budget_spent: 480.0,
            impressions: 10_000,
            clicks: 250,
            conversions: 20,
            conversion_value: 8_000.0,
            roas,
            ctr: 0.025,
            cvr: 0.08,
        }
    }

    #[test]
    fn movers_are_split_by_sign_and_capped() {
        let mut history = Vec::new();
        // Five campaigns with week-1 baselines and varied week-2 moves.
        let week2 = [(1, 100.0, 150.0), (2, 100.0, 130.0), (3, 100.0, 120.0), (4, 100.0, 110.0), (5, 100.0, 60.0)];
        for (id, w1, w2) in week2 {
            history.push(campaign(id, 1, w1));
            history.push(campaign(id, 2, w2));
        }
        let enriched = enrich_campaigns(&history, 2).unwrap();
        let summary = summarize(&enriched, 2);

        assert_eq!(summary.total_campaigns, 5);
        assert_eq!(summary.top_movers.len(), 3);
        assert_eq!(summary.top_movers[0].campaign_id, 1);
        assert_eq!(summary.bottom_movers.len(), 1);
        assert_eq!(summary.bottom_movers[0].campaign_id, 5);
    }

    #[test]
    fn flat_campaigns_produce_no_movers() {
        let history = vec![
            campaign(1, 1, 80.0),
            campaign(1, 2, 80.0),
            campaign(2, 1, 50.0),
            campaign(2, 2, 50.0),
        ];
        let enriched = enrich_campaigns(&history, 2).unwrap();
        let summary = summarize(&enriched, 2);
        assert!(summary.top_movers.is_empty());
        assert!(summary.bottom_movers.is_empty());
        assert_eq!(summary.stable, 2);
    }

    #[test]
    fn statistics_use_population_std() {
        let history = vec![campaign(1, 1, 40.0), campaign(2, 1, 60.0)];
        let enriched = enrich_campaigns(&history, 1).unwrap();
        let summary = summarize(&enriched, 1);
        assert_eq!(summary.roas_mean, 50.0);
        assert_eq!(summary.roas_median, 50.0);
        assert_eq!(summary.roas_std, 10.0);
    }
}
