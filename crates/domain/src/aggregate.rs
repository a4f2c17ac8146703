//! Core aggregate and domain event traits.

use chrono::{DateTime, Utc};
use common::{Actor, AggregateId, Version};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for domain events.
///
/// Domain events are immutable facts named in past tense. Each one carries
/// a snapshot of the resulting state so subscribers never need to look at
/// the aggregate that raised it.
pub trait DomainEvent: Serialize + Clone + Send + Sync + 'static {
    /// Returns the event type name, used for routing and logging.
    fn event_type(&self) -> &'static str;

    /// When the state transition happened.
    fn occurred_at(&self) -> DateTime<Utc>;
}

/// Ordered list of events raised by one aggregate in the current unit of work.
///
/// Aggregate methods append through [`EventBuffer::record`]; the commit path
/// is the only caller of [`EventBuffer::clear`].
#[derive(Debug, Clone)]
pub struct EventBuffer<E> {
    events: Vec<E>,
}

impl<E> Default for EventBuffer<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBuffer<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Audit columns maintained by the unit of work at commit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<Actor>,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<Actor>,
}

impl AuditInfo {
    /// Applies `stamp`: creation columns are written once, modification
    /// columns on every commit.
    pub fn stamp(&mut self, stamp: &AuditStamp) {
        if self.created_at.is_none() {
            self.created_at = Some(stamp.at);
            self.created_by = Some(stamp.actor.clone());
        }
        self.modified_at = Some(stamp.at);
        self.modified_by = Some(stamp.actor.clone());
    }
}

/// Who committed and when.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditStamp {
    pub actor: Actor,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn new(actor: Actor, at: DateTime<Utc>) -> Self {
        Self { actor, at }
    }

    pub fn now(actor: Actor) -> Self {
        Self::new(actor, Utc::now())
    }
}

/// Trait for reference-data aggregates.
///
/// An aggregate is persisted as a state document. Every state-changing
/// method records exactly one event in the aggregate's [`EventBuffer`];
/// the buffer is not part of the persisted state.
pub trait Aggregate: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The type of events this aggregate raises.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    ///
    /// Used as the storage table name and as the cache key namespace.
    fn aggregate_type() -> &'static str;

    /// Returns the aggregate's identifier.
    fn id(&self) -> AggregateId;

    /// Returns the version the aggregate was loaded at.
    fn version(&self) -> Version;

    /// Sets the version after a load or a successful commit.
    fn set_version(&mut self, version: Version);

    fn audit(&self) -> &AuditInfo;

    fn audit_mut(&mut self) -> &mut AuditInfo;

    /// Events raised since the last successful commit, oldest first.
    fn events(&self) -> &EventBuffer<Self::Event>;

    /// Drops all buffered events. Called by the commit path after publishing.
    fn clear_events(&mut self);

    /// Cache key prefix shared by every cached query over this type.
    fn cache_prefix() -> String {
        format!("{}_", Self::aggregate_type())
    }
}
