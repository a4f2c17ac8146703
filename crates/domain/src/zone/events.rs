//! Zone domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Events raised by the zone aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ZoneEvent {
    /// Zone was created.
    ZoneCreated(ZoneEventData),

    /// Zone name or description changed.
    ZoneUpdated(ZoneEventData),

    /// Zone was disabled.
    ZoneDisabled(ZoneEventData),

    /// Zone was re-activated.
    ZoneActivated(ZoneEventData),
}

impl ZoneEvent {
    pub fn data(&self) -> &ZoneEventData {
        match self {
            ZoneEvent::ZoneCreated(data)
            | ZoneEvent::ZoneUpdated(data)
            | ZoneEvent::ZoneDisabled(data)
            | ZoneEvent::ZoneActivated(data) => data,
        }
    }
}

impl DomainEvent for ZoneEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ZoneEvent::ZoneCreated(_) => "ZoneCreated",
            ZoneEvent::ZoneUpdated(_) => "ZoneUpdated",
            ZoneEvent::ZoneDisabled(_) => "ZoneDisabled",
            ZoneEvent::ZoneActivated(_) => "ZoneActivated",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.data().occurred_at
    }
}

/// Payload shared by every zone event: the state after the transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEventData {
    pub zone: ZoneSnapshot,
    pub occurred_at: DateTime<Utc>,
}

/// Zone fields as they stood right after an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub zone_id: AggregateId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_enabled: bool,
}
