//! Linear regression model; exposes no native importances

use serde::Deserialize;

use crate::domain::model::{ModelError, ModelInput, QualityModel};
use crate::domain::{DomainError, FEATURE_COUNT};

#[derive(Debug, Clone, Deserialize)]
pub struct LinearArtifact {
    #[serde(default = "default_version")]
    pub version: String,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

fn default_version() -> String {
    "unversioned".to_string()
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    version: String,
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

impl LinearModel {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self, DomainError> {
        let coefficients: [f64; FEATURE_COUNT] =
            artifact.coefficients.as_slice().try_into().map_err(|_| {
                DomainError::configuration(format!(
                    "Linear model needs {} coefficients, found {}",
                    FEATURE_COUNT,
                    artifact.coefficients.len()
                ))
            })?;

        if !artifact.intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(DomainError::configuration(
                "Linear model parameters must be finite",
            ));
        }

        Ok(Self {
            version: artifact.version,
            intercept: artifact.intercept,
            coefficients,
        })
    }
}

impl QualityModel for LinearModel {
    fn describe(&self) -> String {
        format!("linear:{}", self.version)
    }

    fn predict_one(&self, input: &ModelInput) -> Result<f64, ModelError> {
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(input)
                .map(|(c, x)| c * x)
                .sum::<f64>())
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}
