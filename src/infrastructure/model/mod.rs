//! Model artifacts and loading

mod forest;
mod linear;

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

pub use forest::{ForestArtifact, ForestModel, NodeArtifact, TreeArtifact};
pub use linear::{LinearArtifact, LinearModel};

#[cfg(test)]
pub(crate) use forest::fixtures;

use crate::domain::{DomainError, QualityModel};

/// Supported artifact formats, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelArtifact {
    Forest(ForestArtifact),
    Linear(LinearArtifact),
}

impl ModelArtifact {
    pub fn into_model(self) -> Result<Arc<dyn QualityModel>, DomainError> {
        Ok(match self {
            Self::Forest(artifact) => Arc::new(ForestModel::from_artifact(artifact)?),
            Self::Linear(artifact) => Arc::new(LinearModel::from_artifact(artifact)?),
        })
    }
}

/// Parse a model from its JSON representation
pub fn parse_model(json: &str) -> Result<Arc<dyn QualityModel>, DomainError> {
    let artifact: ModelArtifact = serde_json::from_str(json)
        .map_err(|e| DomainError::configuration(format!("Invalid model artifact: {}", e)))?;

    artifact.into_model()
}

/// Load a model artifact from disk
pub fn load_model(path: impl AsRef<Path>) -> Result<Arc<dyn QualityModel>, DomainError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        DomainError::configuration(format!(
            "Failed to read model artifact '{}': {}",
            path.display(),
            e
        ))
    })?;

    let model = parse_model(&json)?;
    info!(path = %path.display(), model = %model.describe(), "Model loaded");

    Ok(model)
}
