//! Translation of domain and persistence failures into request errors.

use domain::DomainError;
use persistence::{CommitContext, PersistenceError};
use pipeline::{FieldError, RequestContext, RequestError, ValidationFailure};

pub(crate) fn persistence_error(error: PersistenceError) -> RequestError {
    match error {
        PersistenceError::Concurrency { .. } | PersistenceError::Duplicate { .. } => {
            RequestError::Conflict(error.to_string())
        }
        PersistenceError::Cancelled => RequestError::Cancelled,
        other => RequestError::Persistence(other.to_string()),
    }
}

pub(crate) fn domain_error(error: DomainError) -> RequestError {
    match error {
        DomainError::NoChanges { .. } => RequestError::Validation(ValidationFailure::from_iter([
            FieldError::new("request", error.to_string()),
        ])),
        DomainError::AlreadyInState { .. } | DomainError::Invariant(_) => {
            RequestError::Conflict(error.to_string())
        }
    }
}

pub(crate) fn commit_context(ctx: &RequestContext) -> CommitContext {
    CommitContext::new(ctx.actor().clone())
        .with_correlation_id(ctx.correlation_id())
        .with_cancellation(ctx.cancellation().clone())
}
