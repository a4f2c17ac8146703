//! Event publishing and subscriber fan-out.

use std::sync::Arc;

use async_trait::async_trait;
use domain::EventEnvelope;
use tokio::sync::RwLock;

use crate::PublishError;

/// Delivers committed domain events to whoever is interested.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &EventEnvelope) -> Result<(), PublishError>;
}

/// A consumer of committed domain events.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Returns the name of this subscriber.
    fn name(&self) -> &'static str;

    /// Handles a single event.
    async fn handle(&self, event: &EventEnvelope) -> Result<(), PublishError>;
}

/// Publishes each event to every registered subscriber, in registration order.
///
/// A failing subscriber does not stop delivery to the others; the first
/// failure is returned once all subscribers have been offered the event.
#[derive(Clone, Default)]
pub struct SubscriberFanout {
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl SubscriberFanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber.
    pub fn register(&mut self, subscriber: Arc<dyn Subscriber>) {
        self.subscribers.push(subscriber);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, subscriber: impl Subscriber + 'static) -> Self {
        self.register(Arc::new(subscriber));
        self
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[async_trait]
impl EventPublisher for SubscriberFanout {
    #[tracing::instrument(skip_all, fields(event_type = %event.event_type))]
    async fn publish(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        let mut first_failure = None;
        for subscriber in &self.subscribers {
            if let Err(e) = subscriber.handle(event).await {
                tracing::warn!(subscriber = subscriber.name(), error = %e, "subscriber failed");
                first_failure.get_or_insert(e);
            }
        }
        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Writes one structured audit line per committed event.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogSubscriber;

#[async_trait]
impl Subscriber for AuditLogSubscriber {
    fn name(&self) -> &'static str {
        "AuditLogSubscriber"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        let actor = event
            .metadata
            .get("actor")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        tracing::info!(
            target: "audit",
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            version = %event.version,
            actor,
            "domain event committed"
        );
        Ok(())
    }
}

/// Keeps every received event in memory. Cloning shares the log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventLog {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<EventEnvelope> {
        self.events.read().await.clone()
    }

    pub async fn event_types(&self) -> Vec<String> {
        self.events
            .read()
            .await
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.events.write().await.clear();
    }
}

#[async_trait]
impl Subscriber for InMemoryEventLog {
    fn name(&self) -> &'static str {
        "InMemoryEventLog"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
