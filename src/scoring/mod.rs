//! Deterministic per-entity risk scoring.
//!
//! `score = 100 * (0.5 * avg_confidence + 0.3 * volume_score + 0.2 * recency_score)`,
//! clamped to `[0, 100]`. The weights are fixed so a score can always be
//! recomputed from the evidence it was built from.

pub mod aggregate;
pub mod recency;

pub use aggregate::aggregate;
pub use recency::recency_score;

pub const CONFIDENCE_WEIGHT: f64 = 0.5;
pub const VOLUME_WEIGHT: f64 = 0.3;
pub const RECENCY_WEIGHT: f64 = 0.2;

/// Number of relevant articles at which the volume sub-score saturates.
pub const VOLUME_SATURATION_COUNT: usize = 10;
