use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ScoringConfig;
use crate::entity::CanonicalName;
use crate::models::{ClassifiedSnippet, RiskProfile, ScoreBreakdown, Typology, TypologyWeight};
use crate::scoring::recency::recency_score;
use crate::scoring::{CONFIDENCE_WEIGHT, RECENCY_WEIGHT, VOLUME_SATURATION_COUNT, VOLUME_WEIGHT};

/// Combine an entity's classified snippets into its risk profile.
///
/// Only non-neutral snippets feed the score and the typology ranking; every
/// snippet is kept as evidence. With no non-neutral snippet the score is 0.
/// `as_of` is the reference time for recency.
pub fn aggregate(
    entity: CanonicalName,
    classified: Vec<ClassifiedSnippet>,
    as_of: DateTime<Utc>,
    config: &ScoringConfig,
) -> RiskProfile {
    let relevant: Vec<&ClassifiedSnippet> = classified
        .iter()
        .filter(|c| !c.typology.is_neutral())
        .collect();

    let breakdown = score_breakdown(&relevant, as_of, config);
    let score = if relevant.is_empty() {
        0.0
    } else {
        let weighted = CONFIDENCE_WEIGHT * breakdown.avg_confidence
            + VOLUME_WEIGHT * breakdown.volume_score
            + RECENCY_WEIGHT * breakdown.recency_score;
        (weighted * 100.0).clamp(0.0, 100.0)
    };
    let top_typologies = rank_typologies(&relevant);

    debug!(
        entity = %entity,
        snippets = classified.len(),
        relevant = relevant.len(),
        score,
        "aggregated risk profile"
    );

    RiskProfile {
        entity,
        score,
        top_typologies,
        evidence: order_evidence(classified),
        breakdown,
    }
}

fn score_breakdown(
    relevant: &[&ClassifiedSnippet],
    as_of: DateTime<Utc>,
    config: &ScoringConfig,
) -> ScoreBreakdown {
    if relevant.is_empty() {
        return ScoreBreakdown::default();
    }

    let count = relevant.len();
    let avg_confidence = relevant.iter().map(|c| c.confidence).sum::<f64>() / count as f64;

    let volume_term = ((count + 1) as f64).ln();
    let saturation = ((VOLUME_SATURATION_COUNT + 1) as f64).ln();
    let volume_score = (volume_term / saturation).min(1.0);

    let recency_score = relevant
        .iter()
        .filter_map(|c| c.snippet.published_at)
        .max()
        .map(|latest| recency_score(latest, as_of, config.recency_horizon_days))
        .unwrap_or(0.0);

    ScoreBreakdown {
        non_neutral_count: count,
        avg_confidence,
        volume_term,
        volume_score,
        recency_score,
    }
}

/// Summed confidence per typology, heaviest first; ties in declaration order.
fn rank_typologies(relevant: &[&ClassifiedSnippet]) -> Vec<TypologyWeight> {
    let mut sums: BTreeMap<Typology, f64> = BTreeMap::new();
    for c in relevant {
        *sums.entry(c.typology).or_insert(0.0) += c.confidence;
    }

    let mut ranked: Vec<TypologyWeight> = sums
        .into_iter()
        .map(|(typology, weight)| TypologyWeight { typology, weight })
        .collect();
    ranked.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.typology.cmp(&b.typology))
    });
    ranked
}

/// Confidence descending, then newest first (undated last), then input order.
fn order_evidence(mut classified: Vec<ClassifiedSnippet>) -> Vec<ClassifiedSnippet> {
    // sort_by is stable, which keeps input order for full ties.
    classified.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| b.snippet.published_at.cmp(&a.snippet.published_at))
    });
    classified
}
