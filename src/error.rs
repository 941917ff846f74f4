use thiserror::Error;

use crate::models::Typology;

/// Errors surfaced by the scoring core.
///
/// "No evidence" and "no signal" are not errors: an empty snippet list, text
/// with no known tokens and missing timestamps all have defined results.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("invalid entity name {0:?}: nothing left after normalization")]
    InvalidEntityName(String),

    #[error("insufficient training data for {typology}: {found} examples, need at least {required}")]
    InsufficientTrainingData {
        typology: Typology,
        found: usize,
        required: usize,
    },

    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("no trained model available: {0}")]
    ModelUnavailable(String),

    #[error("malformed model: {0}")]
    ModelFormat(String),

    #[error("unknown typology label {0:?}")]
    UnknownTypology(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RiskError>;
