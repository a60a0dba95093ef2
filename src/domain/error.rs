use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Schema error: {message}")]
    Schema { message: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("Limit exceeded: {message}")]
    LimitExceeded { message: String },

    #[error("Model introspection error: {message}")]
    ModelIntrospection { message: String },

    #[error("Degenerate input: {message}")]
    DegenerateInput { message: String },

    #[error("No data: {message}")]
    NoData { message: String },

    #[error("Service not ready: {message}")]
    NotReady { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::LimitExceeded {
            message: message.into(),
        }
    }

    pub fn model_introspection(message: impl Into<String>) -> Self {
        Self::ModelIntrospection {
            message: message.into(),
        }
    }

    pub fn degenerate_input(message: impl Into<String>) -> Self {
        Self::DegenerateInput {
            message: message.into(),
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    pub fn not_ready(message: impl Into<String>) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The bare reason, without the category prefix
    pub fn reason(&self) -> &str {
        match self {
            Self::Schema { message }
            | Self::Inference { message }
            | Self::LimitExceeded { message }
            | Self::ModelIntrospection { message }
            | Self::DegenerateInput { message }
            | Self::NoData { message }
            | Self::NotReady { message }
            | Self::Configuration { message }
            | Self::Internal { message } => message,
        }
    }

    /// Whether the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::Inference { .. } | Self::LimitExceeded { .. }
        )
    }
}
