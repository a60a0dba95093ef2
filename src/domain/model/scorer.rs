//! Scorer - validated single-row and vectorized scoring

use std::sync::Arc;

use tracing::warn;

use super::regressor::{ModelError, ModelInput, QualityModel};
use crate::domain::feature::{FeatureSchema, FeatureVector};
use crate::domain::DomainError;

/// Wraps the loaded model and enforces the input and output contract
#[derive(Debug, Clone)]
pub struct Scorer {
    model: Arc<dyn QualityModel>,
}

impl Scorer {
    pub fn new(model: Arc<dyn QualityModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn QualityModel> {
        &self.model
    }

    /// Score one vector
    pub fn predict_one(&self, vector: &FeatureVector) -> Result<f64, DomainError> {
        FeatureSchema::validate(vector).map_err(|e| DomainError::inference(e.reason()))?;

        let quality = self
            .model
            .predict_one(vector.as_array())
            .map_err(inference_error)?;

        if !quality.is_finite() {
            return Err(inference_error(ModelError::NonFiniteOutput { row: 0 }));
        }

        Ok(quality)
    }

    /// Score many vectors with a single model call, preserving order
    pub fn predict_many(&self, vectors: &[FeatureVector]) -> Result<Vec<f64>, DomainError> {
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        let inputs: Vec<ModelInput> = vectors
            .iter()
            .map(|vector| {
                FeatureSchema::validate(vector)
                    .map(|_| *vector.as_array())
                    .map_err(|e| DomainError::inference(e.reason()))
            })
            .collect::<Result<_, _>>()?;

        let predictions = self.model.predict_many(&inputs).map_err(inference_error)?;

        if predictions.len() != inputs.len() {
            return Err(inference_error(ModelError::LengthMismatch {
                expected: inputs.len(),
                actual: predictions.len(),
            }));
        }

        if let Some(row) = predictions.iter().position(|p| !p.is_finite()) {
            return Err(inference_error(ModelError::NonFiniteOutput { row }));
        }

        Ok(predictions)
    }
}

fn inference_error(err: ModelError) -> DomainError {
    warn!(error = %err, "Model scoring failed");
    DomainError::inference(err.to_string())
}
