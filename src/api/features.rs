//! Feature importance and recommendation endpoints

use std::sync::Arc;

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{FeatureImportance, FeatureSchema, FieldDefinition, Recommendation};

/// GET /features - importance ranking, most important first
pub async fn list_feature_importances(
    State(state): State<AppState>,
) -> Result<Json<Arc<Vec<FeatureImportance>>>, ApiError> {
    let ranking = state.service.feature_importances().await?;
    Ok(Json(ranking))
}

/// GET /features/schema - accepted input fields in model order
pub async fn feature_schema() -> Json<Vec<FieldDefinition>> {
    Json(FeatureSchema::fields())
}

/// GET /recommendations - advice for the strongest driver of quality
pub async fn get_recommendation(
    State(state): State<AppState>,
) -> Result<Json<Recommendation>, ApiError> {
    let recommendation = state.service.recommendation().await?;
    Ok(Json(recommendation))
}
