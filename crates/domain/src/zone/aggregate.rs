//! Zone aggregate implementation.

use chrono::Utc;
use common::{AggregateId, Version};
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, AuditInfo, EventBuffer};
use crate::error::DomainError;

use super::{ZoneEvent, ZoneEventData, ZoneSnapshot};

/// Zone aggregate root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    id: AggregateId,

    #[serde(default)]
    version: Version,

    /// Upper-cased, trimmed business code. Unique ignoring case.
    code: String,

    name: String,

    description: Option<String>,

    is_enabled: bool,

    #[serde(default)]
    audit: AuditInfo,

    #[serde(skip)]
    events: EventBuffer<ZoneEvent>,
}

impl Aggregate for Zone {
    type Event = ZoneEvent;

    fn aggregate_type() -> &'static str {
        "Zone"
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

    fn events(&self) -> &EventBuffer<ZoneEvent> {
        &self.events
    }

    fn clear_events(&mut self) {
        self.events.clear();
    }
}

// Command methods
impl Zone {
    /// Creates an enabled zone and records `ZoneCreated`.
    pub fn create(
        id: AggregateId,
        code: impl AsRef<str>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let mut zone = Self {
            id,
            version: Version::initial(),
            code: Self::normalize_code(code.as_ref()),
            name: name.into(),
            description,
            is_enabled: true,
            audit: AuditInfo::default(),
            events: EventBuffer::new(),
        };
        zone.record(ZoneEvent::ZoneCreated);
        zone
    }

    /// Replaces name and description and records `ZoneUpdated`.
    pub fn update(&mut self, name: impl Into<String>, description: Option<String>) {
        self.name = name.into();
        self.description = description;
        self.record(ZoneEvent::ZoneUpdated);
    }

    /// Disables the zone and records `ZoneDisabled`.
    pub fn disable(&mut self) -> Result<(), DomainError> {
        if !self.is_enabled {
            return Err(DomainError::AlreadyInState {
                entity: Self::aggregate_type(),
                id: self.id,
                state: "disabled",
            });
        }
        self.is_enabled = false;
        self.record(ZoneEvent::ZoneDisabled);
        Ok(())
    }

    /// Re-enables the zone and records `ZoneActivated`.
    pub fn activate(&mut self) -> Result<(), DomainError> {
        if self.is_enabled {
            return Err(DomainError::AlreadyInState {
                entity: Self::aggregate_type(),
                id: self.id,
                state: "active",
            });
        }
        self.is_enabled = true;
        self.record(ZoneEvent::ZoneActivated);
        Ok(())
    }

    fn record(&mut self, variant: fn(ZoneEventData) -> ZoneEvent) {
        let data = ZoneEventData {
            zone: self.snapshot(),
            occurred_at: Utc::now(),
        };
        self.events.record(variant(data));
    }
}

// Query methods
impl Zone {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    /// The stored form of a zone code: trimmed and upper-cased.
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_ascii_uppercase()
    }

    pub fn snapshot(&self) -> ZoneSnapshot {
        ZoneSnapshot {
            zone_id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            is_enabled: self.is_enabled,
        }
    }
}
