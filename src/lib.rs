//! `mediarisk`: resolve entity names, classify adverse media and score entity risk.
//!
//! # Flow
//! 1. Canonicalize the queried name ([`entity::normalize`]).
//! 2. Classify every snippet into a [`models::Typology`] with a confidence
//!    ([`classifier::TrainedModel::classify`]).
//! 3. Aggregate the classified snippets into one [`models::RiskProfile`]
//!    ([`scoring::aggregate`]).
//!
//! [`pipeline::Pipeline`] runs the three steps for one query. Models are
//! trained offline with [`classifier::train`] and moved between processes with
//! [`classifier::TrainedModel::save`] / [`classifier::TrainedModel::load`].

pub mod classifier;
pub mod config;
pub mod corpus;
pub mod entity;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scoring;

pub use error::{Result, RiskError};
pub use pipeline::Pipeline;
