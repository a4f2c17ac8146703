//! Domain error types.

use common::AggregateId;
use thiserror::Error;

/// Business-rule violations raised by aggregate methods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// The aggregate is already in the state the operation would move it to.
    #[error("{entity} {id} is already {state}")]
    AlreadyInState {
        entity: &'static str,
        id: AggregateId,
        state: &'static str,
    },

    /// A patch carried no field to change.
    #[error("{entity} {id}: no changes supplied")]
    NoChanges {
        entity: &'static str,
        id: AggregateId,
    },

    /// A state invariant would be broken.
    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl DomainError {
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }
}
