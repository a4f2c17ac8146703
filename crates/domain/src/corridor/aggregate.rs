//! Corridor aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, AuditInfo, EventBuffer};
use crate::error::DomainError;

use super::{CorridorEvent, CorridorEventData, CorridorSnapshot};

/// Partial update of a corridor. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorridorPatch {
    pub name: Option<String>,
    pub is_enabled: Option<bool>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl CorridorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_enabled.is_none() && self.valid_to.is_none()
    }
}

/// Corridor aggregate root.
///
/// Invariants: source and destination zones differ, and `valid_to`, when
/// set, is strictly after `valid_from`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corridor {
    id: AggregateId,

    #[serde(default)]
    version: Version,

    source_zone_id: AggregateId,

    destination_zone_id: AggregateId,

    name: String,

    is_enabled: bool,

    valid_from: DateTime<Utc>,

    valid_to: Option<DateTime<Utc>>,

    #[serde(default)]
    audit: AuditInfo,

    #[serde(skip)]
    events: EventBuffer<CorridorEvent>,
}

impl Aggregate for Corridor {
    type Event = CorridorEvent;

    fn aggregate_type() -> &'static str {
        "Corridor"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    fn events(&self) -> &EventBuffer<CorridorEvent> {
        &self.events
    }

    fn clear_events(&mut self) {
        self.events.clear();
    }
}

// Command methods
impl Corridor {
    /// Creates an enabled corridor and records `CorridorCreated`.
    pub fn create(
        id: AggregateId,
        source_zone_id: AggregateId,
        destination_zone_id: AggregateId,
        name: impl Into<String>,
        valid_from: DateTime<Utc>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        if source_zone_id == destination_zone_id {
            return Err(DomainError::invariant(
                "corridor source and destination zones must differ",
            ));
        }
        check_window(valid_from, valid_to)?;

        let mut corridor = Self {
            id,
            version: Version::initial(),
            source_zone_id,
            destination_zone_id,
            name: name.into(),
            is_enabled: true,
            valid_from,
            valid_to,
            audit: AuditInfo::default(),
            events: EventBuffer::new(),
        };
        corridor.record(CorridorEvent::CorridorCreated);
        Ok(corridor)
    }

    /// Replaces name and validity window and records `CorridorUpdated`.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        valid_from: DateTime<Utc>,
        valid_to: Option<DateTime<Utc>>,
    ) -> Result<(), DomainError> {
        check_window(valid_from, valid_to)?;
        self.name = name.into();
        self.valid_from = valid_from;
        self.valid_to = valid_to;
        self.record(CorridorEvent::CorridorUpdated);
        Ok(())
    }

    /// Applies the supplied fields and records one `CorridorPatched`.
    pub fn patch(&mut self, patch: CorridorPatch) -> Result<(), DomainError> {
        if patch.is_empty() {
            return Err(DomainError::NoChanges {
                entity: Self::aggregate_type(),
                id: self.id,
            });
        }
        if let Some(valid_to) = patch.valid_to {
            check_window(self.valid_from, Some(valid_to))?;
        }

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(is_enabled) = patch.is_enabled {
            self.is_enabled = is_enabled;
        }
        if let Some(valid_to) = patch.valid_to {
            self.valid_to = Some(valid_to);
        }
        self.record(CorridorEvent::CorridorPatched);
        Ok(())
    }

    /// Disables the corridor and records `CorridorDisabled`.
    pub fn disable(&mut self) -> Result<(), DomainError> {
        if !self.is_enabled {
            return Err(DomainError::AlreadyInState {
                entity: Self::aggregate_type(),
                id: self.id,
                state: "disabled",
            });
        }
        self.is_enabled = false;
        self.record(CorridorEvent::CorridorDisabled);
        Ok(())
    }

    /// Re-enables the corridor and records `CorridorActivated`.
    pub fn activate(&mut self) -> Result<(), DomainError> {
        if self.is_enabled {
            return Err(DomainError::AlreadyInState {
                entity: Self::aggregate_type(),
                id: self.id,
                state: "active",
            });
        }
        self.is_enabled = true;
        self.record(CorridorEvent::CorridorActivated);
        Ok(())
    }

    fn record(&mut self, variant: fn(CorridorEventData) -> CorridorEvent) {
        let data = CorridorEventData {
            corridor: self.snapshot(),
            occurred_at: Utc::now(),
        };
        self.events.record(variant(data));
    }
}

// Query methods
impl Corridor {
    pub fn source_zone_id(&self) -> AggregateId {
        self.source_zone_id
    }

    pub fn destination_zone_id(&self) -> AggregateId {
        self.destination_zone_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_to(&self) -> Option<DateTime<Utc>> {
        self.valid_to
    }

    /// Identifies the pair of zones `a` and `b`, in either direction.
    pub fn link_key(a: AggregateId, b: AggregateId) -> String {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        format!("{lo}:{hi}")
    }

    pub fn snapshot(&self) -> CorridorSnapshot {
        CorridorSnapshot {
            corridor_id: self.id,
            source_zone_id: self.source_zone_id,
            destination_zone_id: self.destination_zone_id,
            name: self.name.clone(),
            is_enabled: self.is_enabled,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
        }
    }
}

fn check_window(
    valid_from: DateTime<Utc>,
    valid_to: Option<DateTime<Utc>>,
) -> Result<(), DomainError> {
    match valid_to {
        Some(valid_to) if valid_to <= valid_from => Err(DomainError::invariant(
            "corridor valid_to must be after valid_from",
        )),
        _ => Ok(()),
    }
}
