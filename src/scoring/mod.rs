// Weighted plan scorer
//
// Collapses the two validator scores, the critic's spatial efficiency and
// the critic's confidence into the single convergence signal. Inputs are
// clamped to [0, 1] before weighting, so the final score is always in range.

use crate::plan::{PlanScore, ScoreComponent};

pub const REGULATORY_WEIGHT: f64 = 0.40;
pub const CULTURAL_WEIGHT: f64 = 0.30;
pub const SPATIAL_WEIGHT: f64 = 0.20;
pub const CRITIC_WEIGHT: f64 = 0.10;

/// Default convergence threshold; a score at or above it stops iteration.
pub const DEFAULT_THRESHOLD: f64 = 0.70;

/// Combine the four subscores into a PlanScore with its breakdown.
pub fn score_plan(
    regulatory: f64,
    cultural: f64,
    spatial: f64,
    critic_confidence: f64,
    threshold: f64,
) -> PlanScore {
    let components = [
        ("regulatory", REGULATORY_WEIGHT, regulatory),
        ("cultural", CULTURAL_WEIGHT, cultural),
        ("spatial", SPATIAL_WEIGHT, spatial),
        ("critic", CRITIC_WEIGHT, critic_confidence),
    ];

    let breakdown: Vec<ScoreComponent> = components
        .iter()
        .map(|(category, weight, raw)| {
            let raw_score = raw.clamp(0.0, 1.0);
            ScoreComponent {
                category: category.to_string(),
                weight: *weight,
                raw_score,
                weighted_score: weight * raw_score,
            }
        })
        .collect();

    let final_score: f64 = breakdown.iter().map(|c| c.weighted_score).sum();

    PlanScore {
        final_score,
        breakdown,
        // Strict >= : landing exactly on the threshold counts as passing
        passes_threshold: final_score >= threshold,
    }
}
