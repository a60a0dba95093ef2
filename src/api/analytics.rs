//! Reference dataset analytics endpoints

use std::sync::Arc;

use axum::extract::State;

use crate::api::state::AppState;
use crate::api::types::{ApiError, CorrelationResponse, Json};
use crate::domain::{DistributionSet, QualityHistogram};

/// GET /analytics/correlation
pub async fn get_correlation(
    State(state): State<AppState>,
) -> Result<Json<CorrelationResponse>, ApiError> {
    let matrix = state.service.correlation().await?;
    Ok(Json(CorrelationResponse::from(matrix.as_ref())))
}

/// GET /analytics/distributions
pub async fn get_distributions(
    State(state): State<AppState>,
) -> Result<Json<Arc<DistributionSet>>, ApiError> {
    let distributions = state.service.distributions().await?;
    Ok(Json(distributions))
}

/// GET /analytics/quality-dist
pub async fn get_quality_distribution(
    State(state): State<AppState>,
) -> Result<Json<Arc<QualityHistogram>>, ApiError> {
    let histogram = state.service.quality_distribution().await?;
    Ok(Json(histogram))
}
