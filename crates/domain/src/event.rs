use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::{AggregateId, Version};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{Aggregate, DomainEvent};

/// A harvested domain event, detached from the aggregate that raised it.
///
/// This is what event subscribers receive after a successful commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,

    /// e.g. "ZoneCreated", "CorridorPatched".
    pub event_type: String,

    pub aggregate_id: AggregateId,

    /// e.g. "Zone", "Corridor".
    pub aggregate_type: String,

    /// The aggregate version produced by the commit that made this event durable.
    pub version: Version,

    /// When the state transition happened, not when it was published.
    pub timestamp: DateTime<Utc>,

    pub payload: serde_json::Value,

    /// Commit-time annotations such as `actor` and `correlation_id`.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelope {
    /// Wraps an event raised by `aggregate`, committed at `version`.
    pub fn from_event<A: Aggregate>(
        aggregate: &A,
        version: Version,
        event: &A::Event,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: Uuid::new_v4(),
            event_type: event.event_type().to_string(),
            aggregate_id: aggregate.id(),
            aggregate_type: A::aggregate_type().to_string(),
            version,
            timestamp: event.occurred_at(),
            payload: serde_json::to_value(event)?,
            metadata: HashMap::new(),
        })
    }

    /// Sets a metadata entry, replacing any previous value.
    pub fn annotate(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    /// Returns a metadata entry as a string, if present and textual.
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|value| value.as_str())
    }

    /// Decodes the payload back into a typed event.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
