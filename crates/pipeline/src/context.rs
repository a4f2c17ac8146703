use common::Actor;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{RequestError, Result};

/// Per-request ambient data passed unchanged through every layer.
#[derive(Debug, Clone)]
pub struct RequestContext {
    actor: Actor,
    correlation_id: String,
    cancellation: CancellationToken,
}

impl RequestContext {
    /// Creates a context for `actor` with a fresh correlation id.
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            correlation_id: Uuid::new_v4().to_string(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fails with [`RequestError::Cancelled`] once the caller has given up.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(RequestError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Actor::system())
    }
}
