use common::Actor;
use tokio_util::sync::CancellationToken;

/// Who is committing, and the request's cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct CommitContext {
    pub actor: Actor,
    pub correlation_id: Option<String>,
    pub cancellation: CancellationToken,
}

impl CommitContext {
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            ..Self::default()
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
