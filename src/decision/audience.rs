//! Audience activation/suppression policy.
//!
//! Each audience starts from its rank-driven `optimal_action` and may
//! be refined to a hold exactly once when the proposed action conflicts
//! with the opposing trend signal. A post-pass then bounds the number
//! of activations and suppressions so the week never degenerates into
//! an all-or-nothing outcome.

use tracing::debug;

use crate::analytics::enrich::EnrichedAudience;
use crate::config::PolicyConfig;
use crate::core::types::{AudienceAction, TrendDirection};
use crate::decision::types::AudienceDecision;

/// Decide an action for every audience in the enriched snapshot, then
/// balance the distribution.
pub fn decide_audiences(audiences: &[EnrichedAudience], policy: &PolicyConfig) -> Vec<AudienceDecision> {
    let mut decisions: Vec<AudienceDecision> = audiences.iter().map(|a| refine(a)).collect();
    balance_distribution(&mut decisions, policy.min_per_side, policy.max_per_side);
    decisions
}

/// Apply at most one refinement to the precomputed optimal action.
/// An action is never flipped to its opposite, only softened to a hold.
fn refine(a: &EnrichedAudience) -> AudienceDecision {
    let score = a.composite_health_score;
    let (action, reason) = match a.optimal_action {
        // Fatigue is a cost metric: an "improving" fatigue trend means
        // the score is rising, i.e. the audience is wearing out.
        AudienceAction::Activate if a.fatigue_trend == TrendDirection::Improving => (
            AudienceAction::NoChange,
            format!(
                "Health rank #{} qualifies for activation but fatigue is accumulating ({:.1}); holding to avoid burnout",
                a.health_rank, a.row.fatigue_score
            ),
        ),
        AudienceAction::Suppress if a.engagement_trend == TrendDirection::Improving => (
            AudienceAction::NoChange,
            format!(
                "Health rank #{} is weak but engagement is recovering; holding rather than suppressing into an upturn",
                a.health_rank
            ),
        ),
        AudienceAction::Activate => (
            AudienceAction::Activate,
            format!(
                "Premium health profile (score {score:.1}, rank #{}) with stable fatigue; activation maximises quality reach",
                a.health_rank
            ),
        ),
        AudienceAction::Suppress => (
            AudienceAction::Suppress,
            format!(
                "Deteriorating vitality (score {score:.1}, rank #{}); suppression prevents wasted frequency",
                a.health_rank
            ),
        ),
        AudienceAction::NoChange => (
            AudienceAction::NoChange,
            format!("Balanced health position (score {score:.1}, rank #{}); sustain current targeting", a.health_rank),
        ),
    };
    AudienceDecision {
        audience_id: a.row.audience_id.clone(),
        audience_name: a.row.audience_name.clone(),
        action,
        reason,
        health_score: score,
        rank: a.health_rank,
    }
}

/// Bound activations and suppressions to `[min_per_side, max_per_side]`
/// by converting the nearest-ranked boundary entities, working from the
/// extremes inward. Idempotent: a second run changes nothing. Skipped
/// for snapshots smaller than twice the minimum.
pub fn balance_distribution(decisions: &mut [AudienceDecision], min_per_side: usize, max_per_side: usize) {
    if decisions.len() < min_per_side * 2 {
        return;
    }

    // Demote surplus first so promotions below never overshoot.
    demote_surplus(decisions, AudienceAction::Activate, max_per_side, /*best_first=*/ false);
    demote_surplus(decisions, AudienceAction::Suppress, max_per_side, /*best_first=*/ true);
    promote_deficit(decisions, AudienceAction::Activate, min_per_side, /*best_first=*/ true);
    promote_deficit(decisions, AudienceAction::Suppress, min_per_side, /*best_first=*/ false);
}

fn count_of(decisions: &[AudienceDecision], action: AudienceAction) -> usize {
    decisions.iter().filter(|d| d.action == action).count()
}

/// Convert the boundary-most holders of `action` back to no-change
/// until the count fits under `max`.
fn demote_surplus(decisions: &mut [AudienceDecision], action: AudienceAction, max: usize, best_first: bool) {
    let mut surplus = count_of(decisions, action).saturating_sub(max);
    if surplus == 0 {
        return;
    }
    let mut order: Vec<usize> = (0..decisions.len()).filter(|&i| decisions[i].action == action).collect();
    // The boundary of an activation run is its worst rank; of a
    // suppression run, its best rank.
    order.sort_by_key(|&i| decisions[i].rank);
    if !best_first {
        order.reverse();
    }
    for i in order {
        if surplus == 0 {
            break;
        }
        debug!(audience = %decisions[i].audience_id, rank = decisions[i].rank, "distribution guard demoted to no_change");
        decisions[i].action = AudienceAction::NoChange;
        decisions[i].reason = format!(
            "Distribution guard: reverted to no_change at health rank #{} to keep the weekly mix bounded",
            decisions[i].rank
        );
        surplus -= 1;
    }
}

/// Convert the nearest-ranked holds into `action` until the count
/// reaches `min`. When the hold pool runs out, conversion continues
/// with the boundary-most entities of the opposite action, still
/// working from the extremes inward; for lists of at least twice the
/// minimum this can never drag the opposite side below the minimum.
fn promote_deficit(decisions: &mut [AudienceDecision], action: AudienceAction, min: usize, best_first: bool) {
    let mut deficit = min.saturating_sub(count_of(decisions, action));
    if deficit == 0 {
        return;
    }
    let (opposite, verb) = match action {
        AudienceAction::Activate => (AudienceAction::Suppress, "activated"),
        AudienceAction::Suppress => (AudienceAction::Activate, "suppressed"),
        AudienceAction::NoChange => unreachable!("promotion target is never no_change"),
    };
    let mut holds: Vec<usize> = (0..decisions.len())
        .filter(|&i| decisions[i].action == AudienceAction::NoChange)
        .collect();
    let mut flips: Vec<usize> = (0..decisions.len())
        .filter(|&i| decisions[i].action == opposite)
        .collect();
    holds.sort_by_key(|&i| decisions[i].rank);
    flips.sort_by_key(|&i| decisions[i].rank);
    if !best_first {
        holds.reverse();
        flips.reverse();
    }
    for i in holds.into_iter().chain(flips) {
        if deficit == 0 {
            break;
        }
        debug!(audience = %decisions[i].audience_id, rank = decisions[i].rank, "distribution guard promoted");
        decisions[i].action = action;
        decisions[i].reason = format!(
            "Distribution guard: {verb} at health rank #{} to preserve a working activation/suppression mix",
            decisions[i].rank
        );
        deficit -= 1;
    }
}
