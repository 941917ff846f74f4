use serde::Serialize;

use crate::classifier::model::{argmax, softmax, Classification, TrainedModel};
use crate::models::Typology;

/// How much one token moved the winning class's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenContribution {
    pub token: String,
    /// TF-IDF value of the token in this text.
    pub feature_value: f64,
    /// Weight of the token for the winning class.
    pub coefficient: f64,
    /// `coefficient * feature_value`.
    pub contribution: f64,
}

/// Audit trail for a single classification.
///
/// `intercept + Σ contribution` equals the winning class's logit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub typology: Typology,
    pub confidence: f64,
    pub intercept: f64,
    /// Sorted by absolute contribution, largest first.
    pub contributions: Vec<TokenContribution>,
}

impl Explanation {
    pub fn logit(&self) -> f64 {
        self.intercept + self.contributions.iter().map(|c| c.contribution).sum::<f64>()
    }

    pub fn classification(&self) -> Classification {
        Classification {
            typology: self.typology,
            confidence: self.confidence,
        }
    }
}

/// Classify `text` and break the winning score down per token.
pub fn explain(model: &TrainedModel, text: &str) -> Explanation {
    let features = model.features(text);
    if features.is_empty() {
        let no_signal = Classification::NO_SIGNAL;
        return Explanation {
            typology: no_signal.typology,
            confidence: no_signal.confidence,
            intercept: model.intercept(no_signal.typology).unwrap_or(0.0),
            contributions: Vec::new(),
        };
    }

    let probs = softmax(&model.logits(&features));
    let row = argmax(&probs);

    let mut tokens_by_index = vec![""; model.vocabulary.len()];
    for (token, &idx) in &model.vocabulary {
        tokens_by_index[idx] = token.as_str();
    }

    let weights = &model.coefficients[row];
    let mut contributions: Vec<TokenContribution> = features
        .iter()
        .map(|&(idx, value)| TokenContribution {
            token: tokens_by_index[idx].to_string(),
            feature_value: value,
            coefficient: weights[idx],
            contribution: weights[idx] * value,
        })
        .collect();

    contributions.sort_by(|a, b| {
        b.contribution
            .abs()
            .total_cmp(&a.contribution.abs())
            .then_with(|| a.token.cmp(&b.token))
    });

    Explanation {
        typology: model.classes[row],
        confidence: probs[row],
        intercept: model.intercepts[row],
        contributions,
    }
}

impl TrainedModel {
    /// See [`explain`].
    pub fn explain(&self, text: &str) -> Explanation {
        explain(self, text)
    }
}
