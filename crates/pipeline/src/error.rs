use thiserror::Error;

use crate::validation::ValidationFailure;

/// Wiring mistakes in the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("a handler for {0} is already registered")]
    DuplicateHandler(&'static str),

    #[error("no handler registered for {0}")]
    MissingHandler(&'static str),
}

/// Everything a request can fail with.
///
/// `Validation`, `NotFound` and `Conflict` are expected business outcomes;
/// the remaining variants are infrastructure or wiring failures.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("Validation failed: {0}")]
    Validation(ValidationFailure),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RequestError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Short label used as the `outcome` in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::Validation(_) => "validation",
            RequestError::NotFound { .. } => "not_found",
            RequestError::Conflict(_) => "conflict",
            RequestError::Persistence(_) => "persistence",
            RequestError::Cancelled => "cancelled",
            RequestError::Configuration(_) => "configuration",
            RequestError::Internal(_) => "internal",
        }
    }

    /// True for outcomes caused by the caller's input or timing rather than
    /// by the service.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            RequestError::Validation(_)
                | RequestError::NotFound { .. }
                | RequestError::Conflict(_)
                | RequestError::Cancelled
        )
    }
}

impl From<ValidationFailure> for RequestError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

/// Result type for request handling.
pub type Result<T> = std::result::Result<T, RequestError>;
