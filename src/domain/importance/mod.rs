//! Feature importance ranking derived from the model's native scores

use std::sync::Arc;

use serde::Serialize;

use crate::domain::feature::{Feature, FEATURE_COUNT};
use crate::domain::model::QualityModel;
use crate::domain::DomainError;

/// Normalized contribution of one feature to the model's predictions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: Feature,
    pub importance: f64,
}

/// Reads and normalizes the loaded model's importances
#[derive(Debug, Clone)]
pub struct ImportanceRanker {
    model: Arc<dyn QualityModel>,
}

impl ImportanceRanker {
    pub fn new(model: Arc<dyn QualityModel>) -> Self {
        Self { model }
    }

    /// Weights summing to 1.0, descending, ties in schema order
    pub fn rank(&self) -> Result<Vec<FeatureImportance>, DomainError> {
        let raw = self.model.feature_importances().ok_or_else(|| {
            DomainError::model_introspection(format!(
                "Model '{}' does not expose feature importances",
                self.model.describe()
            ))
        })?;

        normalize_importances(&raw)
    }
}

/// Normalize raw scores and sort them
pub fn normalize_importances(raw: &[f64]) -> Result<Vec<FeatureImportance>, DomainError> {
    if raw.len() != FEATURE_COUNT {
        return Err(DomainError::model_introspection(format!(
            "Expected {} importance scores, model reported {}",
            FEATURE_COUNT,
            raw.len()
        )));
    }

    if let Some((index, value)) = raw
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(DomainError::model_introspection(format!(
            "Importance for '{}' is invalid: {}",
            Feature::ALL[index],
            value
        )));
    }

    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Err(DomainError::model_introspection(
            "All feature importances are zero",
        ));
    }

    let mut ranked: Vec<FeatureImportance> = Feature::ALL
        .into_iter()
        .zip(raw)
        .map(|(feature, value)| FeatureImportance {
            feature,
            importance: value / total,
        })
        .collect();

    // Stable sort keeps schema order among equal weights
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    Ok(ranked)
}
