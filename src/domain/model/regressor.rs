//! Capability interface for a trained quality regressor

use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::domain::feature::FEATURE_COUNT;

/// One row of model input in schema order
pub type ModelInput = [f64; FEATURE_COUNT];

/// Failures raised by a model implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("model produced a non-finite output for row {row}")]
    NonFiniteOutput { row: usize },

    #[error("model returned {actual} predictions for {expected} rows")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    Failed(String),
}

/// A trained regressor over the fixed 11-feature contract.
///
/// Implementations are read-only after construction and shared across
/// requests, so every method takes `&self`.
#[cfg_attr(test, automock)]
pub trait QualityModel: Send + Sync + Debug {
    /// Short identifier of the loaded artifact (kind and version)
    fn describe(&self) -> String;

    fn predict_one(&self, input: &ModelInput) -> Result<f64, ModelError>;

    /// Score many rows in one call; the default loops over `predict_one`
    fn predict_many(&self, inputs: &[ModelInput]) -> Result<Vec<f64>, ModelError> {
        inputs.iter().map(|input| self.predict_one(input)).collect()
    }

    /// Native per-feature importance scores, unnormalized, in schema order
    fn feature_importances(&self) -> Option<Vec<f64>>;
}
