//! Fixed feature contract shared by the model, the analytics and the batch parser

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::vector::FeatureVector;
use crate::domain::DomainError;

/// Number of chemical attributes the model consumes
pub const FEATURE_COUNT: usize = 11;

/// Runs of whitespace, underscores or hyphens collapse to a single separator
static SEPARATOR_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_\-]+").unwrap());

/// A single chemical measurement, in model input order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    FixedAcidity,
    VolatileAcidity,
    CitricAcid,
    ResidualSugar,
    Chlorides,
    FreeSulfurDioxide,
    TotalSulfurDioxide,
    Density,
    #[serde(rename = "pH")]
    Ph,
    Sulphates,
    Alcohol,
}

impl Feature {
    /// All features in declaration (model input) order
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::FixedAcidity,
        Feature::VolatileAcidity,
        Feature::CitricAcid,
        Feature::ResidualSugar,
        Feature::Chlorides,
        Feature::FreeSulfurDioxide,
        Feature::TotalSulfurDioxide,
        Feature::Density,
        Feature::Ph,
        Feature::Sulphates,
        Feature::Alcohol,
    ];

    /// Canonical field name
    pub fn name(self) -> &'static str {
        match self {
            Self::FixedAcidity => "fixed_acidity",
            Self::VolatileAcidity => "volatile_acidity",
            Self::CitricAcid => "citric_acid",
            Self::ResidualSugar => "residual_sugar",
            Self::Chlorides => "chlorides",
            Self::FreeSulfurDioxide => "free_sulfur_dioxide",
            Self::TotalSulfurDioxide => "total_sulfur_dioxide",
            Self::Density => "density",
            Self::Ph => "pH",
            Self::Sulphates => "sulphates",
            Self::Alcohol => "alcohol",
        }
    }

    /// Position in the model input vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label: title-cased name, except `pH` which keeps its casing
    pub fn label(self) -> String {
        if self == Self::Ph {
            return "pH".to_string();
        }

        self.name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resolve a header or JSON key onto a feature.
    ///
    /// Matching ignores case and surrounding whitespace, and treats spaces,
    /// underscores and hyphens as the same separator.
    pub fn resolve(raw: &str) -> Option<Self> {
        let key = normalize_name(raw);
        Self::ALL
            .into_iter()
            .find(|feature| normalize_name(feature.name()) == key)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalize a column or key name for lookup
pub fn normalize_name(raw: &str) -> String {
    SEPARATOR_PATTERN
        .replace_all(raw.trim(), "_")
        .trim_matches('_')
        .to_lowercase()
}

/// Semantic type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Float,
}

/// One entry of the feature schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub feature: Feature,
    pub name: &'static str,
    pub label: String,
    pub field_type: FieldType,
}

/// The fixed, ordered definition of the model's input attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSchema;

impl FeatureSchema {
    /// Ordered field definitions
    pub fn fields() -> Vec<FieldDefinition> {
        Feature::ALL
            .into_iter()
            .map(|feature| FieldDefinition {
                feature,
                name: feature.name(),
                label: feature.label(),
                field_type: FieldType::Float,
            })
            .collect()
    }

    /// Re-check that every value of a vector is usable as model input
    pub fn validate(vector: &FeatureVector) -> Result<(), DomainError> {
        for feature in Feature::ALL {
            let value = vector.get(feature);

            if !value.is_finite() {
                return Err(DomainError::schema(format!(
                    "Field '{}' must be a finite number, got {}",
                    feature, value
                )));
            }
        }

        Ok(())
    }

    /// Build a vector from a JSON object, coercing numeric strings
    pub fn from_json(
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<FeatureVector, DomainError> {
        let mut builder = FeatureVectorBuilder::new();

        for (key, value) in object {
            let Some(feature) = Feature::resolve(key) else {
                continue;
            };

            let number = match value {
                serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| {
                    DomainError::schema(format!("Field '{}' is not representable as a float", feature))
                })?,
                serde_json::Value::String(s) => parse_cell(feature, s)?,
                other => {
                    return Err(DomainError::schema(format!(
                        "Field '{}' must be numeric, got {}",
                        feature,
                        json_type_name(other)
                    )));
                }
            };

            builder.set(feature, number)?;
        }

        builder.build()
    }
}

/// Parse one textual cell into a finite float
pub fn parse_cell(feature: Feature, raw: &str) -> Result<f64, DomainError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(DomainError::schema(format!("Field '{}' is empty", feature)));
    }

    let value: f64 = trimmed.parse().map_err(|_| {
        DomainError::schema(format!(
            "Field '{}' is not numeric: '{}'",
            feature, trimmed
        ))
    })?;

    if !value.is_finite() {
        return Err(DomainError::schema(format!(
            "Field '{}' must be a finite number, got {}",
            feature, trimmed
        )));
    }

    Ok(value)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Collects feature values in any order and checks completeness on build
#[derive(Debug, Clone, Default)]
pub struct FeatureVectorBuilder {
    slots: [Option<f64>; FEATURE_COUNT],
}

impl FeatureVectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; the first assignment of a feature wins
    pub fn set(&mut self, feature: Feature, value: f64) -> Result<(), DomainError> {
        if !value.is_finite() {
            return Err(DomainError::schema(format!(
                "Field '{}' must be a finite number, got {}",
                feature, value
            )));
        }

        let slot = &mut self.slots[feature.index()];
        if slot.is_none() {
            *slot = Some(value);
        }

        Ok(())
    }

    pub fn build(self) -> Result<FeatureVector, DomainError> {
        let missing: Vec<&str> = Feature::ALL
            .into_iter()
            .filter(|feature| self.slots[feature.index()].is_none())
            .map(Feature::name)
            .collect();

        if !missing.is_empty() {
            return Err(DomainError::schema(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut values = [0.0; FEATURE_COUNT];
        for (value, slot) in values.iter_mut().zip(self.slots) {
            *value = slot.unwrap_or_default();
        }

        FeatureVector::from_values(values)
    }
}
