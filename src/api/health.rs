//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;
use crate::infrastructure::services::ServiceState;

use super::state::AppState;

/// Health response with optional component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ServiceState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Simple health check - returns 200 if the process is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        state: None,
        version: None,
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check - 503 until the model and reference dataset are loaded
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let service_state = state.service.state();

    let checks = match service_state {
        ServiceState::Uninitialized => vec![HealthCheck {
            name: "engine".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some("Model and reference dataset are not loaded".to_string()),
        }],
        ServiceState::Ready | ServiceState::Serving => engine_checks(&state),
    };

    let overall_status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    let response = HealthResponse {
        status: overall_status,
        state: Some(service_state),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness check - simple check to verify the service is running
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn engine_checks(state: &AppState) -> Vec<HealthCheck> {
    match state.service.loaded() {
        Some(engine) => {
            let rows = engine.analytics().dataset().len();

            vec![
                HealthCheck {
                    name: "model".to_string(),
                    status: HealthStatus::Healthy,
                    message: Some(format!(
                        "{} loaded at {}",
                        engine.scorer().model().describe(),
                        engine.loaded_at().to_rfc3339()
                    )),
                },
                HealthCheck {
                    name: "dataset".to_string(),
                    status: HealthStatus::Healthy,
                    message: Some(format!("{} reference rows", rows)),
                },
            ]
        }
        None => vec![HealthCheck {
            name: "engine".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some("Engine is not loaded".to_string()),
        }],
    }
}
