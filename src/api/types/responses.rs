//! Response and query types for the engine endpoints

use serde::{Deserialize, Serialize};

use crate::domain::{CorrelationMatrix, CorrelationNode, Feature};

/// Correlation heatmap: axis order plus every cell
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationResponse {
    pub features: Vec<Feature>,
    pub nodes: Vec<CorrelationNode>,
}

impl From<&CorrelationMatrix> for CorrelationResponse {
    fn from(matrix: &CorrelationMatrix) -> Self {
        Self {
            features: matrix.features(),
            nodes: matrix.nodes(),
        }
    }
}

/// Query string of `POST /predict`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PredictQuery {
    /// Echo the validated features back with the score
    #[serde(default)]
    pub echo: bool,
}
