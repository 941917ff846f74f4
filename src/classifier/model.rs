use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::tokenize::tokenize;
use crate::classifier::vectorizer::{transform, SparseVector};
use crate::error::{Result, RiskError};
use crate::models::Typology;

/// Predicted typology for one text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub typology: Typology,
    /// Softmax probability of `typology`, in `[0, 1]`.
    pub confidence: f64,
}

impl Classification {
    /// Result for text that shares no token with the vocabulary.
    pub const NO_SIGNAL: Classification = Classification {
        typology: Typology::Neutral,
        confidence: 0.0,
    };
}

/// TF-IDF vocabulary plus one-vs-rest logistic weights.
///
/// Built by [`crate::classifier::train`], read-only afterwards. Share it across
/// threads behind an `Arc`; inference never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub(crate) classes: Vec<Typology>,
    pub(crate) vocabulary: BTreeMap<String, usize>,
    pub(crate) idf_weights: Vec<f64>,
    /// One row per entry of `classes`, one column per vocabulary index.
    pub(crate) coefficients: Vec<Vec<f64>>,
    pub(crate) intercepts: Vec<f64>,
}

impl TrainedModel {
    pub fn classes(&self) -> &[Typology] {
        &self.classes
    }

    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, token: &str) -> Option<f64> {
        self.vocabulary.get(token).map(|&idx| self.idf_weights[idx])
    }

    pub fn coefficient(&self, typology: Typology, token: &str) -> Option<f64> {
        let row = self.class_row(typology)?;
        self.vocabulary
            .get(token)
            .map(|&idx| self.coefficients[row][idx])
    }

    pub fn intercept(&self, typology: Typology) -> Option<f64> {
        self.class_row(typology).map(|row| self.intercepts[row])
    }

    pub(crate) fn class_row(&self, typology: Typology) -> Option<usize> {
        self.classes.iter().position(|&c| c == typology)
    }

    pub(crate) fn features(&self, text: &str) -> SparseVector {
        transform(&tokenize(text), &self.vocabulary, &self.idf_weights)
    }

    pub(crate) fn logits(&self, features: &SparseVector) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| b + features.iter().map(|&(i, x)| row[i] * x).sum::<f64>())
            .collect()
    }

    /// Full class distribution for `text`; sums to 1.
    pub fn probabilities(&self, text: &str) -> Vec<(Typology, f64)> {
        let logits = self.logits(&self.features(text));
        self.classes.iter().copied().zip(softmax(&logits)).collect()
    }

    /// Most probable typology and its probability.
    ///
    /// Text without any in-vocabulary token is `Neutral` with confidence 0.
    pub fn classify(&self, text: &str) -> Classification {
        let features = self.features(text);
        if features.is_empty() {
            return Classification::NO_SIGNAL;
        }

        let probs = softmax(&self.logits(&features));
        let best = argmax(&probs);
        Classification {
            typology: self.classes[best],
            confidence: probs[best],
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| RiskError::ModelFormat(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model: TrainedModel =
            serde_json::from_slice(bytes).map_err(|e| RiskError::ModelFormat(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        info!(path = %path.display(), vocabulary = self.vocabulary_len(), "saved model");
        Ok(())
    }

    /// Load a model written by [`TrainedModel::save`].
    ///
    /// A missing file is [`RiskError::ModelUnavailable`]; unreadable contents
    /// are [`RiskError::ModelFormat`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RiskError::ModelUnavailable(format!(
                "no model file at {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path)?;
        let model = Self::from_bytes(&bytes)?;
        info!(path = %path.display(), vocabulary = model.vocabulary_len(), "loaded model");
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        let dim = self.vocabulary.len();
        if self.classes.is_empty() {
            return Err(RiskError::ModelFormat("model has no classes".to_string()));
        }
        if self.idf_weights.len() != dim {
            return Err(RiskError::ModelFormat(format!(
                "{} idf weights for a vocabulary of {}",
                self.idf_weights.len(),
                dim
            )));
        }
        if self.coefficients.len() != self.classes.len() || self.intercepts.len() != self.classes.len() {
            return Err(RiskError::ModelFormat(
                "coefficient rows do not match class count".to_string(),
            ));
        }
        if self.coefficients.iter().any(|row| row.len() != dim) {
            return Err(RiskError::ModelFormat(
                "coefficient row length does not match vocabulary".to_string(),
            ));
        }
        let distinct: BTreeSet<Typology> = self.classes.iter().copied().collect();
        if distinct.len() != self.classes.len() {
            return Err(RiskError::ModelFormat("duplicate class in model".to_string()));
        }

        // Indices must be a permutation of 0..dim.
        let mut seen = vec![false; dim];
        for (token, &idx) in &self.vocabulary {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(RiskError::ModelFormat(format!(
                        "vocabulary index {idx} of {token:?} is used twice"
                    )))
                }
                None => {
                    return Err(RiskError::ModelFormat(format!(
                        "vocabulary index {idx} of {token:?} is out of range"
                    )))
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

pub(crate) fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; ties go to the earliest index.
pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
