//! Feature schema and feature vectors

mod schema;
mod vector;

pub use schema::{
    normalize_name, parse_cell, Feature, FeatureSchema, FeatureVectorBuilder, FieldDefinition,
    FieldType, FEATURE_COUNT,
};
pub use vector::{FeatureVector, PredictionResult};

#[cfg(test)]
pub(crate) use vector::fixtures;
