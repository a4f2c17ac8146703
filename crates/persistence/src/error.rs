use thiserror::Error;

use common::{AggregateId, Version};

/// Errors that can occur when loading or committing aggregates.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Optimistic concurrency check failed: someone else committed first.
    #[error(
        "Concurrency conflict on {aggregate_type} {aggregate_id}: expected version {expected}, found {actual}"
    )]
    Concurrency {
        aggregate_type: String,
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// A unique key reserved by this commit is already held by another owner.
    #[error("{scope} {key} is already taken")]
    Duplicate { scope: String, key: String },

    /// The backing store could not be reached or refused the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Aggregate state could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The request was cancelled before the commit started.
    #[error("Commit cancelled")]
    Cancelled,
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Errors reported by event publishers and subscribers.
///
/// These never roll back a commit; they are logged and counted.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// A subscriber rejected or failed to process the event.
    #[error("Subscriber {subscriber} failed: {message}")]
    Subscriber {
        subscriber: &'static str,
        message: String,
    },

    /// The publishing transport is unavailable.
    #[error("Publisher unavailable: {0}")]
    Unavailable(String),
}

impl PublishError {
    pub fn subscriber(subscriber: &'static str, message: impl Into<String>) -> Self {
        Self::Subscriber {
            subscriber,
            message: message.into(),
        }
    }
}
