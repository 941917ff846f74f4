use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::info;

use crate::classifier::{Explanation, TrainedModel};
use crate::config::ScoringConfig;
use crate::entity::normalize;
use crate::error::{Result, RiskError};
use crate::models::{ClassifiedSnippet, RawSnippet, RiskProfile};
use crate::scoring::aggregate;

/// Name → classify → aggregate, for one entity query at a time.
///
/// Holds no per-request state. The model is shared read-only, so one
/// `Pipeline` can serve concurrent queries.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    model: Option<Arc<TrainedModel>>,
    scoring: ScoringConfig,
}

impl Pipeline {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self {
            model: None,
            scoring,
        }
    }

    pub fn with_model(mut self, model: Arc<TrainedModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn model(&self) -> Result<&TrainedModel> {
        self.model
            .as_deref()
            .ok_or_else(|| RiskError::ModelUnavailable("no model loaded into the pipeline".to_string()))
    }

    /// Classify each snippet independently; output order matches input order.
    pub fn classify(&self, snippets: Vec<RawSnippet>) -> Result<Vec<ClassifiedSnippet>> {
        if snippets.is_empty() {
            return Ok(Vec::new());
        }
        let model = self.model()?;

        Ok(snippets
            .into_par_iter()
            .map(|snippet| {
                let c = model.classify(&snippet.text());
                ClassifiedSnippet {
                    snippet,
                    typology: c.typology,
                    confidence: c.confidence,
                }
            })
            .collect())
    }

    /// Score `raw_name` against `snippets` as of now.
    pub fn run(&self, raw_name: &str, snippets: Vec<RawSnippet>) -> Result<RiskProfile> {
        self.run_at(raw_name, snippets, Utc::now())
    }

    /// Score `raw_name` against `snippets` with recency measured from `as_of`.
    ///
    /// No snippets is a valid query and gives a zero-score profile, even
    /// without a model.
    pub fn run_at(
        &self,
        raw_name: &str,
        snippets: Vec<RawSnippet>,
        as_of: DateTime<Utc>,
    ) -> Result<RiskProfile> {
        let entity = normalize(raw_name)?;
        let snippet_count = snippets.len();
        let classified = self.classify(snippets)?;
        let profile = aggregate(entity, classified, as_of, &self.scoring);

        info!(
            entity = %profile.entity,
            snippets = snippet_count,
            score = profile.score,
            band = %profile.band(),
            "scored entity"
        );

        Ok(profile)
    }

    /// Per-token audit trail for one snippet.
    pub fn explain(&self, snippet: &RawSnippet) -> Result<Explanation> {
        Ok(self.model()?.explain(&snippet.text()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::classifier::train;
    use crate::classifier::train::fixtures::sample_corpus;
    use crate::config::TrainingConfig;
    use crate::models::Typology;

    fn trained_pipeline() -> Pipeline {
        let config = TrainingConfig {
            epochs: 20,
            ..TrainingConfig::default()
        };
        let model = train(&sample_corpus(12), &config).unwrap();
        Pipeline::new(ScoringConfig::default()).with_model(Arc::new(model))
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_snippets_without_model() {
        let pipeline = Pipeline::default();
        let profile = pipeline.run_at("Acme Corp.", Vec::new(), as_of()).unwrap();
        assert_eq!(profile.entity.as_str(), "acme");
        assert_eq!(profile.score, 0.0);
        assert!(profile.evidence.is_empty());
        assert!(profile.top_typologies.is_empty());
    }

    #[test]
    fn test_model_required_for_snippets() {
        let pipeline = Pipeline::default();
        let err = pipeline
            .run_at("Acme", vec![RawSnippet::new("Acme fined", "")], as_of())
            .unwrap_err();
        assert!(matches!(err, RiskError::ModelUnavailable(_)));
        assert!(matches!(
            pipeline.explain(&RawSnippet::new("x", "y")),
            Err(RiskError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_invalid_name_checked_first() {
        let err = Pipeline::default().run_at("  ...  ", Vec::new(), as_of()).unwrap_err();
        assert!(matches!(err, RiskError::InvalidEntityName(_)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pipeline = trained_pipeline();
        let snippets: Vec<RawSnippet> = (0..40)
            .map(|i| match i % 3 {
                0 => RawSnippet::new(format!("Item {i}"), "Allegations of wire fraud and embezzlement"),
                1 => RawSnippet::new(format!("Item {i}"), "Quarterly earnings beat expectations"),
                _ => RawSnippet::new(format!("Item {i}"), "Vessel seized under embargo"),
            })
            .collect();

        let model = pipeline.model().unwrap();
        let sequential: Vec<_> = snippets.iter().map(|s| model.classify(&s.text())).collect();
        let parallel = pipeline.classify(snippets.clone()).unwrap();

        assert_eq!(parallel.len(), snippets.len());
        for ((p, s), snippet) in parallel.iter().zip(&sequential).zip(&snippets) {
            assert_eq!(&p.snippet, snippet);
            assert_eq!(p.typology, s.typology);
            assert_eq!(p.confidence, s.confidence);
        }
    }

    #[test]
    fn test_run_end_to_end() {
        let pipeline = trained_pipeline();
        let today = as_of();
        let snippets = vec![
            RawSnippet::new("Acme linked to Ponzi scheme", "Investors defrauded in securities fraud").published_at(today),
            RawSnippet::new("Acme news update", "Analysts are optimistic after the new product launch").published_at(today),
            RawSnippet::new("Acme probe widens", "Authorities investigate wire fraud and fake accounts").published_at(today),
        ];

        let profile = pipeline.run_at("ACME Corp.", snippets, today).unwrap();
        assert_eq!(profile.entity.as_str(), "acme");
        assert_eq!(profile.evidence.len(), 3);
        assert_eq!(profile.primary_typology(), Some(Typology::Fraud));
        assert!(profile.score > 0.0 && profile.score <= 100.0);
        assert!(profile
            .evidence
            .windows(2)
            .all(|w| w[0].confidence >= w[1].confidence));

        let exp = pipeline.explain(&profile.evidence[0].snippet).unwrap();
        assert_eq!(exp.typology, profile.evidence[0].typology);
    }
}
