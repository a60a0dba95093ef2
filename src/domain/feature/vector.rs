//! Feature vector and prediction result types

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::schema::{Feature, FEATURE_COUNT};
use crate::domain::DomainError;

/// A complete, finite set of the 11 chemical attributes in model input order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build from values in schema order
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Result<Self, DomainError> {
        if let Some(feature) = Feature::ALL
            .into_iter()
            .find(|feature| !values[feature.index()].is_finite())
        {
            return Err(DomainError::schema(format!(
                "Field '{}' must be a finite number, got {}",
                feature,
                values[feature.index()]
            )));
        }

        Ok(Self { values })
    }

    /// Look up a value by feature
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Values in model input order
    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(|feature| (feature, self.get(feature)))
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

/// Model output for one sample
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PredictionResult {
    pub quality: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
}

impl PredictionResult {
    pub fn new(quality: f64) -> Self {
        Self {
            quality,
            features: None,
        }
    }

    /// Echo the input vector alongside the score
    pub fn with_features(mut self, features: FeatureVector) -> Self {
        self.features = Some(features);
        self
    }
}
