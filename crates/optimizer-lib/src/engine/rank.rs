//! Savings scoring and ranking
//!
//! Projects the savings of applying a recommendation, normalized so CPU
//! cores and memory bytes are commensurable, and sorts scored
//! recommendations descending. A dimension with no declared request is
//! omitted from the formula, never treated as zero.

use std::cmp::Ordering;

use super::Recommendations;
use crate::models::{Recommendation, ScoredRecommendation};

/// One core of CPU savings weighs the same as 2 GiB of memory savings.
pub const MEMORY_SCORE_NORMALIZER_BYTES: f64 = 2.0 * 1024.0 * 1024.0 * 1024.0;

/// Projected savings of one recommendation. `None` when neither dimension
/// has a request baseline to compare against.
pub fn score(recommendation: &Recommendation) -> Option<f64> {
    let cpu_term = match (
        recommendation.current.requests.cpu,
        recommendation.recommended.cpu,
    ) {
        (Some(requested), Some(recommended)) => Some(requested - recommended),
        _ => None,
    };
    let memory_term = match (
        recommendation.current.requests.memory,
        recommendation.recommended.memory,
    ) {
        (Some(requested), Some(recommended)) => {
            Some((requested - recommended) / MEMORY_SCORE_NORMALIZER_BYTES)
        }
        _ => None,
    };

    match (cpu_term, memory_term) {
        (None, None) => None,
        (cpu, memory) => Some(cpu.unwrap_or(0.0) + memory.unwrap_or(0.0)),
    }
}

/// Rank the scored recommendations strictly descending by score.
///
/// Ties break on ascending workload key (namespace/kind/name/container),
/// which is total, so the output order is deterministic.
pub fn rank(recommendations: Recommendations) -> (Vec<ScoredRecommendation>, Vec<Recommendation>) {
    let mut ranked: Vec<ScoredRecommendation> = recommendations
        .scored
        .into_iter()
        .filter_map(|recommendation| {
            score(&recommendation).map(|score| ScoredRecommendation {
                recommendation,
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| key_of(&a.recommendation).cmp(&key_of(&b.recommendation)))
    });

    (ranked, recommendations.unscored)
}

fn key_of(recommendation: &Recommendation) -> (&str, &str, &str, &str) {
    (
        recommendation.controller.namespace.as_str(),
        recommendation.controller.kind.as_str(),
        recommendation.controller.name.as_str(),
        recommendation.container.as_str(),
    )
}
