//! Supervised risk-typology classifier.
//!
//! - [`tokenize`]: lower-case word tokens minus English stop words.
//! - [`vectorizer`]: document-frequency capped vocabulary and smoothed TF-IDF.
//! - [`train`]: one-vs-rest L2-regularized logistic regression fitted by seeded SGD.
//! - [`model`]: the immutable [`TrainedModel`], inference and byte persistence.
//! - [`explain`]: per-token contributions to the winning class's score.

pub mod explain;
pub mod model;
pub mod tokenize;
pub mod train;
pub mod vectorizer;

pub use explain::{explain, Explanation, TokenContribution};
pub use model::{Classification, TrainedModel};
pub use train::{train, train_with_progress, TrainingReport};
