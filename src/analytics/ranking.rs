//! Cross-sectional ranking and audience health scoring.
//!
//! Ranking is a stable descending sort over one metric within a single
//! period snapshot. Stability means ties keep their snapshot order, so
//! a given snapshot always produces the same ranks.

use std::collections::HashMap;
use std::hash::Hash;

use crate::core::math::round2;
use crate::core::types::{AudienceAction, AudienceRow, RankRecord};

/// Assign a rank and percentile to every entity in the snapshot.
///
/// Ranks are exactly `1..=N`, each used once. Percentile is
/// `round((1 - (rank - 1) / N) * 100)`: rank 1 maps to 100 and the
/// last rank approaches zero without necessarily reaching it.
pub fn rank_period<I>(pairs: &[(I, f64)]) -> HashMap<I, RankRecord>
where
    I: Eq + Hash + Clone,
{
    let n = pairs.len();
    let mut ordered: Vec<&(I, f64)> = pairs.iter().collect();
    ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, (id, _))| {
            let rank = idx + 1;
            (id.clone(), RankRecord { rank, percentile: percentile_of(rank, n) })
        })
        .collect()
}

/// Percentile for a 1-based rank within a snapshot of `n` entities.
pub fn percentile_of(rank: usize, n: usize) -> u8 {
    if n == 0 {
        return 0;
    }
    ((1.0 - (rank as f64 - 1.0) / n as f64) * 100.0).round() as u8
}

/// Position of a rank relative to the configured top/bottom cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Top,
    Middle,
    Bottom,
}

/// Classify a 1-based rank using integer entity-count thresholds:
/// the top cut is `floor(n * top_frac)` entities and the bottom cut
/// starts at index `ceil(n * (1 - bottom_frac))`, so boundary entities
/// are assigned deterministically.
pub fn rank_tier(rank: usize, n: usize, top_frac: f64, bottom_frac: f64) -> RankTier {
    let idx = rank - 1;
    let top_count = (n as f64 * top_frac).floor() as usize;
    let bottom_start = (n as f64 * (1.0 - bottom_frac)).ceil() as usize;
    if idx < top_count {
        RankTier::Top
    } else if idx >= bottom_start {
        RankTier::Bottom
    } else {
        RankTier::Middle
    }
}

/// Fixed-weight linear combination of audience intent, engagement and
/// fatigue signals. Higher is healthier.
pub fn composite_health_score(row: &AudienceRow) -> f64 {
    round2(
        row.intent_score * 2.0 + row.avg_ctr * 1000.0 + row.avg_cvr * 500.0
            - row.fatigue_score * 1.5
            - row.frequency * 2.0,
    )
}

/// Precompute the rank-driven audience action: top cut activates, the
/// bottom cut suppresses, the middle holds.
pub fn optimal_action(
    rank: usize,
    n: usize,
    activate_frac: f64,
    suppress_frac: f64,
) -> AudienceAction {
    match rank_tier(rank, n, activate_frac, suppress_frac) {
        RankTier::Top => AudienceAction::Activate,
        RankTier::Bottom => AudienceAction::Suppress,
        RankTier::Middle => AudienceAction::NoChange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(values: &[f64]) -> Vec<(u32, f64)> {
        values.iter().enumerate().map(|(i, v)| (i as u32, *v)).collect()
    }

    #[test]
    fn ranks_are_total_and_unique() {
        let ranks = rank_period(&snapshot(&[3.0, 9.0, 1.0, 7.0, 5.0]));
        let mut seen: Vec<usize> = ranks.values().map(|r| r.rank).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
        assert_eq!(ranks[&1].rank, 1);
        assert_eq!(ranks[&2].rank, 5);
    }

    #[test]
    fn ties_keep_snapshot_order() {
        let ranks = rank_period(&snapshot(&[4.0, 4.0, 4.0]));
        assert_eq!(ranks[&0].rank, 1);
        assert_eq!(ranks[&1].rank, 2);
        assert_eq!(ranks[&2].rank, 3);
    }

    #[test]
    fn percentile_is_monotonic_in_rank() {
        let n = 7;
        let mut last: u8 = 101;
        for rank in 1..=n {
            let p = percentile_of(rank, n);
            assert!(p < last, "percentile must decrease with rank");
            last = p;
        }
        assert_eq!(percentile_of(1, n), 100);
    }

    #[test]
    fn audience_action_cuts_match_the_ten_entity_scenario() {
        // Health scores 95..32 descending produce ranks 1..10; the 30%
        // cuts activate ranks 1-3 and suppress ranks 8-10.
        let scores = [95.0, 88.0, 81.0, 74.0, 67.0, 60.0, 53.0, 46.0, 39.0, 32.0];
        let ranks = rank_period(&snapshot(&scores));
        for (id, record) in &ranks {
            let action = optimal_action(record.rank, 10, 0.30, 0.30);
            let expected = match record.rank {
                1..=3 => AudienceAction::Activate,
                8..=10 => AudienceAction::Suppress,
                _ => AudienceAction::NoChange,
            };
            assert_eq!(action, expected, "id {id} rank {}", record.rank);
        }
    }

    #[test]
    fn composite_health_applies_fixed_weights() {
        let row = AudienceRow {
            audience_id: "AUD1".into(),
            audience_name: "In-market".into(),
            week: 3,
            intent_score: 80.0,
            fatigue_score: 20.0,
            avg_ctr: 0.03,
            avg_cvr: 0.05,
            frequency: 4.0,
            is_suppressed: false,
        };
        // 160 + 30 + 25 - 30 - 8 = 177
        assert_eq!(composite_health_score(&row), 177.0);
    }

    #[test]
    fn small_snapshot_tiers_stay_deterministic() {
        // n = 7: top cut floor(2.1) = 2 entities, bottom starts at
        // ceil(4.9) = index 5.
        assert_eq!(rank_tier(2, 7, 0.30, 0.30), RankTier::Top);
        assert_eq!(rank_tier(3, 7, 0.30, 0.30), RankTier::Middle);
        assert_eq!(rank_tier(5, 7, 0.30, 0.30), RankTier::Middle);
        assert_eq!(rank_tier(6, 7, 0.30, 0.30), RankTier::Bottom);
    }
}
