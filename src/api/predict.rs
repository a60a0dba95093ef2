//! Single and batch prediction endpoints

use axum::extract::{Multipart, Query, State};
use bytes::Bytes;
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, PredictQuery};
use crate::domain::{BatchRow, FeatureSchema, PredictionResult};

/// Multipart field expected to carry the table
const FILE_FIELD: &str = "file";

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    Query(query): Query<PredictQuery>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<PredictionResult>, ApiError> {
    let vector = FeatureSchema::from_json(&body)?;
    let result = state.service.predict(vector, query.echo).await?;

    Ok(Json(result))
}

/// POST /predict/batch - multipart upload of a delimited table
pub async fn predict_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Vec<BatchRow>>, ApiError> {
    let data = read_upload(multipart).await?;
    let rows = state.service.predict_batch(data).await?;

    Ok(Json(rows))
}

/// Take the `file` field, or failing that the first field carrying a file name
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    let mut fallback = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        if name != FILE_FIELD && (!is_file || fallback.is_some()) {
            continue;
        }

        let data = field.bytes().await.map_err(multipart_error)?;
        debug!(field = %name, bytes = data.len(), "Received upload");

        if name == FILE_FIELD {
            return Ok(data);
        }
        fallback = Some(data);
    }

    fallback.ok_or_else(|| ApiError::bad_request("No file uploaded; expected a 'file' field"))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(err.status(), err.body_text())
}
