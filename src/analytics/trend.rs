//! Per-entity trend analysis over a single metric's weekly series.
//!
//! [`compute_trend`] is a pure function of the ordered historical
//! series; it never looks at the clock and never looks ahead of the
//! series it is given. The caller is responsible for truncating the
//! series at the current week before calling in.

use crate::core::math::{mean, momentum_pct, population_std, round2, sample_std};
use crate::core::types::{TrendConsistency, TrendDirection, TrendRecord};

/// Momentum beyond this magnitude flips the direction classification
/// away from `Stable`.
const DIRECTION_THRESHOLD_PCT: f64 = 5.0;

/// Analyse one metric's history, ordered ascending by week. The last
/// element is the current week's value.
pub fn compute_trend(history: &[(u32, f64)]) -> TrendRecord {
    let values: Vec<f64> = history.iter().map(|(_, v)| *v).collect();

    if values.len() < 2 {
        return TrendRecord {
            direction: TrendDirection::Stable,
            momentum_1week: 0.0,
            momentum_3week: 0.0,
            avg_3week: round2(values.first().copied().unwrap_or(0.0)),
            volatility: 0.0,
            consistency: TrendConsistency::InsufficientData,
        };
    }

    let momentum_1week = momentum_pct(values[values.len() - 2], values[values.len() - 1]);

    let momentum_3week;
    let avg_3week;
    let consistency;
    if values.len() >= 3 {
        let last3 = &values[values.len() - 3..];
        avg_3week = mean(last3);
        momentum_3week = momentum_pct(last3[0], last3[2]);
        let delta_a = last3[1] - last3[0];
        let delta_b = last3[2] - last3[1];
        consistency = if delta_a > 0.0 && delta_b > 0.0 {
            TrendConsistency::ConsistentImproving
        } else if delta_a < 0.0 && delta_b < 0.0 {
            TrendConsistency::ConsistentDeclining
        } else {
            TrendConsistency::Volatile
        };
    } else {
        // Exactly two points: average those two and fall back to the
        // 1-week momentum for the longer horizon.
        avg_3week = mean(&values);
        momentum_3week = momentum_1week;
        consistency = TrendConsistency::LimitedData;
    }

    // The 3-week momentum is the more stable signal, so it drives the
    // direction whenever three points exist.
    let driving = if values.len() >= 3 { momentum_3week } else { momentum_1week };
    let direction = if driving > DIRECTION_THRESHOLD_PCT {
        TrendDirection::Improving
    } else if driving < -DIRECTION_THRESHOLD_PCT {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    };

    let volatility = if values.len() >= 3 {
        population_std(&values[values.len() - 3..])
    } else {
        sample_std(&values)
    };

    TrendRecord {
        direction,
        momentum_1week: round2(momentum_1week),
        momentum_3week: round2(momentum_3week),
        avg_3week: round2(avg_3week),
        volatility: round2(volatility),
        consistency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::approx_eq;

    fn series(values: &[f64]) -> Vec<(u32, f64)> {
        values.iter().enumerate().map(|(i, v)| (i as u32 + 1, *v)).collect()
    }

    #[test]
    fn empty_history_is_insufficient() {
        let t = compute_trend(&[]);
        assert_eq!(t.direction, TrendDirection::Stable);
        assert_eq!(t.consistency, TrendConsistency::InsufficientData);
        assert_eq!(t.avg_3week, 0.0);
        assert_eq!(t.momentum_1week, 0.0);
    }

    #[test]
    fn single_point_uses_value_as_average() {
        let t = compute_trend(&series(&[42.5]));
        assert_eq!(t.consistency, TrendConsistency::InsufficientData);
        assert_eq!(t.avg_3week, 42.5);
        assert_eq!(t.volatility, 0.0);
    }

    #[test]
    fn roas_trend_from_three_rising_weeks() {
        // ROAS 50 -> 55 -> 66: +20% over one week, +32% over three.
        let t = compute_trend(&series(&[50.0, 55.0, 66.0]));
        assert!(approx_eq(t.momentum_1week, 20.0, 1e-9));
        assert!(approx_eq(t.momentum_3week, 32.0, 1e-9));
        assert_eq!(t.consistency, TrendConsistency::ConsistentImproving);
        assert_eq!(t.direction, TrendDirection::Improving);
        assert_eq!(t.avg_3week, 57.0);
    }

    #[test]
    fn two_points_fall_back_to_short_momentum() {
        let t = compute_trend(&series(&[100.0, 90.0]));
        assert!(approx_eq(t.momentum_1week, -10.0, 1e-9));
        assert_eq!(t.momentum_3week, t.momentum_1week);
        assert_eq!(t.consistency, TrendConsistency::LimitedData);
        assert_eq!(t.direction, TrendDirection::Declining);
        assert_eq!(t.avg_3week, 95.0);
    }

    #[test]
    fn mixed_deltas_classify_as_volatile() {
        let t = compute_trend(&series(&[100.0, 120.0, 110.0]));
        assert_eq!(t.consistency, TrendConsistency::Volatile);
    }

    #[test]
    fn zero_previous_value_yields_zero_momentum() {
        let t = compute_trend(&series(&[0.0, 50.0]));
        assert_eq!(t.momentum_1week, 0.0);
    }

    #[test]
    fn direction_prefers_three_week_momentum() {
        // 1-week momentum is flat but the 3-week move is large: the
        // longer horizon wins once three points exist.
        let t = compute_trend(&series(&[50.0, 64.0, 65.0]));
        assert!(t.momentum_1week.abs() < 5.0);
        assert!(t.momentum_3week > 5.0);
        assert_eq!(t.direction, TrendDirection::Improving);
    }

    #[test]
    fn volatility_uses_population_formula_on_three_points() {
        // Last three points 2, 4, 6: population std = sqrt(8/3) ~ 1.63.
        let t = compute_trend(&series(&[2.0, 4.0, 6.0]));
        assert_eq!(t.volatility, 1.63);
    }

    #[test]
    fn only_last_three_points_drive_the_record() {
        let long = compute_trend(&series(&[9.0, 1.0, 50.0, 55.0, 66.0]));
        let short = compute_trend(&series(&[50.0, 55.0, 66.0]));
        assert_eq!(long, short);
    }

    #[test]
    fn deterministic_across_repeated_runs() {
        let h = series(&[3.0, 2.0, 8.0, 7.5]);
        assert_eq!(compute_trend(&h), compute_trend(&h));
    }
}
