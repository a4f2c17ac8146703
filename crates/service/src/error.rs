//! Transport-facing view of request failures.

use std::collections::BTreeMap;

use pipeline::RequestError;
use serde::Serialize;

/// Error body a transport adapter returns to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// HTTP-style status code.
    pub status: u16,

    /// Machine-readable error code.
    pub code: &'static str,

    pub message: String,

    /// Per-field messages, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    /// Returns true for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

impl From<&RequestError> for ErrorResponse {
    fn from(err: &RequestError) -> Self {
        let status = match err {
            RequestError::Validation(_) => 400,
            RequestError::NotFound { .. } => 404,
            RequestError::Conflict(_) => 409,
            RequestError::Cancelled => 499,
            RequestError::Persistence(_) => 503,
            RequestError::Configuration(_) | RequestError::Internal(_) => 500,
        };

        let fields = match err {
            RequestError::Validation(failure) => Some(failure.errors().clone()),
            _ => None,
        };

        // Server-side details stay in the logs.
        let message = match err {
            RequestError::Persistence(_) => "storage is temporarily unavailable".to_string(),
            RequestError::Configuration(_) | RequestError::Internal(_) => {
                tracing::error!(error = %err, "internal error");
                "internal error".to_string()
            }
            _ => err.to_string(),
        };

        Self {
            status,
            code: err.kind(),
            message,
            fields,
        }
    }
}

impl From<RequestError> for ErrorResponse {
    fn from(err: RequestError) -> Self {
        Self::from(&err)
    }
}
