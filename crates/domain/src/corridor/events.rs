//! Corridor domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events raised by the corridor aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CorridorEvent {
    /// Corridor was created.
    CorridorCreated(CorridorEventData),

    /// Corridor was fully updated.
    CorridorUpdated(CorridorEventData),

    /// Some corridor fields were changed.
    CorridorPatched(CorridorEventData),

    /// Corridor was disabled.
    CorridorDisabled(CorridorEventData),

    /// Corridor was re-activated.
    CorridorActivated(CorridorEventData),
}

impl CorridorEvent {
    pub fn data(&self) -> &CorridorEventData {
        match self {
            CorridorEvent::CorridorCreated(data)
            | CorridorEvent::CorridorUpdated(data)
            | CorridorEvent::CorridorPatched(data)
            | CorridorEvent::CorridorDisabled(data)
            | CorridorEvent::CorridorActivated(data) => data,
        }
    }
}

impl DomainEvent for CorridorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CorridorEvent::CorridorCreated(_) => "CorridorCreated",
            CorridorEvent::CorridorUpdated(_) => "CorridorUpdated",
            CorridorEvent::CorridorPatched(_) => "CorridorPatched",
            CorridorEvent::CorridorDisabled(_) => "CorridorDisabled",
            CorridorEvent::CorridorActivated(_) => "CorridorActivated",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.data().occurred_at
    }
}

/// Payload shared by every corridor event: the state after the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorEventData {
    pub corridor: CorridorSnapshot,
    pub occurred_at: DateTime<Utc>,
}

/// Corridor fields as they stood right after an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorSnapshot {
    pub corridor_id: AggregateId,
    pub source_zone_id: AggregateId,
    pub destination_zone_id: AggregateId,
    pub name: String,
    pub is_enabled: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
}
