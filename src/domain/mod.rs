//! Domain layer - Feature contract, scoring and dataset statistics

pub mod batch;
pub mod dataset;
pub mod error;
pub mod feature;
pub mod importance;
pub mod model;
pub mod recommendation;
pub mod statistics;

pub use batch::{score_chunk, BatchRow, ColumnMapping, RawRow, RowOutcome};
pub use dataset::{ReferenceDataset, ReferenceRow};
pub use error::DomainError;
pub use feature::{
    Feature, FeatureSchema, FeatureVector, FieldDefinition, PredictionResult, FEATURE_COUNT,
};
pub use importance::{FeatureImportance, ImportanceRanker};
pub use model::{ModelError, ModelInput, QualityModel, Scorer};
pub use recommendation::{Recommendation, RecommendationAdvisor};
pub use statistics::{
    CorrelationMatrix, CorrelationNode, DistributionPolicy, DistributionProfile, DistributionSet,
    QualityCount, QualityHistogram,
};
