use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::model::{argmax, sigmoid, TrainedModel};
use crate::classifier::tokenize::tokenize;
use crate::classifier::vectorizer::{fit, transform, SparseVector};
use crate::config::TrainingConfig;
use crate::error::{Result, RiskError};
use crate::models::Typology;

const CLASS_COUNT: usize = Typology::ALL.len();

/// Statistics gathered while fitting a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub documents: usize,
    pub class_counts: Vec<(Typology, usize)>,
    pub vocabulary_size: usize,
    pub epochs: usize,
    /// Mean weighted log-loss over all one-vs-rest problems in the last epoch.
    pub final_loss: f64,
    /// Share of the training corpus the fitted model labels correctly.
    pub training_accuracy: f64,
}

/// Fit a TF-IDF + one-vs-rest logistic model on a labeled corpus.
///
/// Every typology needs at least `config.min_examples_per_class` examples.
/// The same corpus and config (seed included) always give the same
/// coefficients, bit for bit.
pub fn train(corpus: &[(String, Typology)], config: &TrainingConfig) -> Result<TrainedModel> {
    train_with_progress(corpus, config, |_| {}).map(|(model, _)| model)
}

/// [`train`], calling `on_epoch` with the number of finished epochs.
pub fn train_with_progress<F>(
    corpus: &[(String, Typology)],
    config: &TrainingConfig,
    mut on_epoch: F,
) -> Result<(TrainedModel, TrainingReport)>
where
    F: FnMut(usize),
{
    if corpus.is_empty() {
        return Err(RiskError::EmptyCorpus);
    }

    let mut class_counts = [0usize; CLASS_COUNT];
    for (_, typology) in corpus {
        class_counts[typology.index()] += 1;
    }
    for typology in Typology::ALL {
        let found = class_counts[typology.index()];
        if found < config.min_examples_per_class {
            return Err(RiskError::InsufficientTrainingData {
                typology,
                found,
                required: config.min_examples_per_class,
            });
        }
    }

    let documents: Vec<Vec<String>> = corpus.iter().map(|(text, _)| tokenize(text)).collect();
    let fitted = fit(&documents, config.max_features);
    let features: Vec<SparseVector> = documents
        .iter()
        .map(|doc| transform(doc, &fitted.vocabulary, &fitted.idf))
        .collect();
    let labels: Vec<usize> = corpus.iter().map(|(_, t)| t.index()).collect();
    let dim = fitted.vocabulary.len();
    let n = corpus.len();

    info!(documents = n, vocabulary = dim, epochs = config.epochs, "training classifier");

    // "Balanced" weighting: each example counts n / (k * n_class).
    let sample_weights: Vec<f64> = labels
        .iter()
        .map(|&label| {
            if config.balanced {
                n as f64 / (CLASS_COUNT as f64 * class_counts[label] as f64)
            } else {
                1.0
            }
        })
        .collect();

    let mut weights: Vec<WeightVector> = (0..CLASS_COUNT).map(|_| WeightVector::zeros(dim)).collect();
    let mut intercepts = vec![0.0; CLASS_COUNT];
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut final_loss = 0.0;

    for epoch in 0..config.epochs {
        order.shuffle(&mut rng);
        let lr = config.learning_rate / (1.0 + config.decay * epoch as f64);
        let shrink = 1.0 - lr * config.l2;
        let mut epoch_loss = 0.0;

        for &i in &order {
            let x = &features[i];
            let sw = sample_weights[i];
            for class in 0..CLASS_COUNT {
                let y = if labels[i] == class { 1.0 } else { 0.0 };
                let p = sigmoid(intercepts[class] + weights[class].dot(x));
                epoch_loss += sw * log_loss(p, y);

                let gradient = sw * (p - y);
                weights[class].scale_by(shrink);
                weights[class].add_sparse(x, -lr * gradient);
                intercepts[class] -= lr * gradient;
            }
        }

        final_loss = epoch_loss / (n * CLASS_COUNT) as f64;
        debug!(epoch = epoch + 1, lr, loss = final_loss, "finished epoch");
        on_epoch(epoch + 1);
    }

    let model = TrainedModel {
        classes: Typology::ALL.to_vec(),
        vocabulary: fitted.vocabulary,
        idf_weights: fitted.idf,
        coefficients: weights.into_iter().map(WeightVector::into_dense).collect(),
        intercepts,
    };

    let correct = features
        .iter()
        .zip(&labels)
        .filter(|(x, &label)| {
            let predicted = if x.is_empty() {
                Typology::Neutral.index()
            } else {
                argmax(&model.logits(x))
            };
            predicted == label
        })
        .count();

    let report = TrainingReport {
        documents: n,
        class_counts: Typology::ALL
            .iter()
            .map(|&t| (t, class_counts[t.index()]))
            .collect(),
        vocabulary_size: dim,
        epochs: config.epochs,
        final_loss,
        training_accuracy: correct as f64 / n as f64,
    };

    info!(
        accuracy = report.training_accuracy,
        loss = report.final_loss,
        "classifier trained"
    );

    Ok((model, report))
}

fn log_loss(p: f64, y: f64) -> f64 {
    const EPS: f64 = 1e-15;
    let p = p.clamp(EPS, 1.0 - EPS);
    -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
}

/// Dense weights stored as `scale * values`, so L2 shrinkage is O(1) per step.
struct WeightVector {
    values: Vec<f64>,
    scale: f64,
}

impl WeightVector {
    fn zeros(dim: usize) -> Self {
        Self {
            values: vec![0.0; dim],
            scale: 1.0,
        }
    }

    fn dot(&self, x: &SparseVector) -> f64 {
        self.scale * x.iter().map(|&(i, v)| self.values[i] * v).sum::<f64>()
    }

    fn scale_by(&mut self, factor: f64) {
        if factor <= 0.0 {
            self.values.fill(0.0);
            self.scale = 1.0;
            return;
        }
        self.scale *= factor;
        if self.scale < 1e-9 {
            for v in &mut self.values {
                *v *= self.scale;
            }
            self.scale = 1.0;
        }
    }

    fn add_sparse(&mut self, x: &SparseVector, factor: f64) {
        for &(i, v) in x {
            self.values[i] += factor * v / self.scale;
        }
    }

    fn into_dense(self) -> Vec<f64> {
        let scale = self.scale;
        self.values.into_iter().map(|v| v * scale).collect()
    }
}
