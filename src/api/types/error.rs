//! HTTP error responses

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::DomainError;

/// Seconds a client should wait before retrying while the engine loads
const RETRY_AFTER_SECS: u64 = 5;

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub detail: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
    pub retry_after: Option<u64>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                detail: detail.into(),
            },
            retry_after: None,
        }
    }

    /// Ask the client to retry after the given number of seconds
    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    /// Bad request error
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    /// Request body failed validation
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    /// Upload too large
    pub fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, detail)
    }

    /// Internal server error
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    /// Service unavailable
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.response)).into_response();

        if let Some(seconds) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let detail = err.reason().to_string();

        let api_err = match &err {
            DomainError::Schema { .. } => Self::unprocessable(detail),
            DomainError::Inference { .. } => Self::bad_request(detail),
            DomainError::LimitExceeded { .. } => Self::payload_too_large(detail),
            DomainError::NotReady { .. } => {
                Self::unavailable(detail).with_retry_after(RETRY_AFTER_SECS)
            }
            DomainError::ModelIntrospection { .. }
            | DomainError::DegenerateInput { .. }
            | DomainError::NoData { .. }
            | DomainError::Configuration { .. }
            | DomainError::Internal { .. } => Self::internal(detail),
        };

        if api_err.status.is_server_error() {
            error!(status = api_err.status.as_u16(), error = %err, "Request failed");
        } else {
            debug!(status = api_err.status.as_u16(), error = %err, "Request rejected");
        }

        api_err
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.detail)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::schema("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::inference("x"), StatusCode::BAD_REQUEST),
            (DomainError::limit_exceeded("x"), StatusCode::PAYLOAD_TOO_LARGE),
            (DomainError::model_introspection("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::degenerate_input("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::no_data("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::not_ready("x"), StatusCode::SERVICE_UNAVAILABLE),
            (DomainError::configuration("x"), StatusCode::INTERNAL_SERVER_ERROR),
            (DomainError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain_err, status) in cases {
            let api_err: ApiError = domain_err.into();
            assert_eq!(api_err.status, status);
        }
    }

    #[test]
    fn test_detail_is_the_bare_reason() {
        let api_err: ApiError = DomainError::schema("Missing required fields: pH").into();
        let json = serde_json::to_string(&api_err.response).unwrap();

        assert_eq!(json, r#"{"detail":"Missing required fields: pH"}"#);
    }

    #[test]
    fn test_not_ready_sets_retry_after() {
        let api_err: ApiError = DomainError::not_ready("loading").into();
        let response = api_err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[header::RETRY_AFTER].to_str().unwrap(),
            RETRY_AFTER_SECS.to_string()
        );
    }
}
