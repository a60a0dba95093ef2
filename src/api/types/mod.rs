//! Request, response and error types of the HTTP API

pub mod error;
pub mod json;
pub mod responses;

pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
pub use responses::{CorrelationResponse, PredictQuery};
