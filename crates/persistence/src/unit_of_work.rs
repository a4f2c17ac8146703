use std::sync::Arc;

use common::{AggregateId, Version};
use domain::{Aggregate, AuditStamp, EventEnvelope};

use crate::context::CommitContext;
use crate::interceptor::CommitHook;
use crate::reservation::{RESERVATION_TYPE, Reservation};
use crate::store::{RecordChange, Store, StoredRecord};
use crate::{PersistenceError, Result};

/// Object-safe view of a tracked aggregate, so one unit of work can hold
/// aggregates of different types.
pub trait TrackedAggregate: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn aggregate_id(&self) -> AggregateId;

    /// Version the aggregate was loaded at (or created at).
    fn loaded_version(&self) -> Version;

    fn apply_stamp(&mut self, stamp: &AuditStamp);

    /// Serializes current state as a record written at `version`.
    fn to_record(&self, version: Version) -> serde_json::Result<StoredRecord>;

    fn mark_committed(&mut self, version: Version);

    fn pending_events(&self) -> usize;

    /// Wraps every buffered event, oldest first, without clearing the buffer.
    fn harvest(&self) -> serde_json::Result<Vec<EventEnvelope>>;

    fn discard_events(&mut self);
}

impl<A: Aggregate> TrackedAggregate for A {
    fn type_name(&self) -> &'static str {
        A::aggregate_type()
    }

    fn aggregate_id(&self) -> AggregateId {
        self.id()
    }

    fn loaded_version(&self) -> Version {
        self.version()
    }

    fn apply_stamp(&mut self, stamp: &AuditStamp) {
        self.audit_mut().stamp(stamp);
    }

    fn to_record(&self, version: Version) -> serde_json::Result<StoredRecord> {
        Ok(StoredRecord {
            aggregate_type: A::aggregate_type().to_string(),
            aggregate_id: self.id(),
            version,
            state: serde_json::to_value(self)?,
        })
    }

    fn mark_committed(&mut self, version: Version) {
        self.set_version(version);
    }

    fn pending_events(&self) -> usize {
        self.events().len()
    }

    fn harvest(&self) -> serde_json::Result<Vec<EventEnvelope>> {
        self.events()
            .iter()
            .map(|event| EventEnvelope::from_event(self, self.version(), event))
            .collect()
    }

    fn discard_events(&mut self) {
        self.clear_events();
    }
}

/// The set of aggregates changed by one request, committed together.
///
/// `commit` consumes the unit of work: on failure the tracked aggregates
/// and their buffered events are dropped unpublished.
pub struct UnitOfWork<S> {
    store: S,
    hook: Arc<dyn CommitHook>,
    tracked: Vec<Box<dyn TrackedAggregate>>,
    reservations: Vec<Reservation>,
}

impl<S: Store> UnitOfWork<S> {
    pub fn new(store: S, hook: Arc<dyn CommitHook>) -> Self {
        Self {
            store,
            hook,
            tracked: Vec::new(),
            reservations: Vec::new(),
        }
    }

    /// Adds an aggregate to be written by the next commit.
    pub fn track<A: Aggregate>(&mut self, aggregate: A) {
        self.tracked.push(Box::new(aggregate));
    }

    /// Claims a unique key in the same atomic commit. The commit fails with
    /// [`PersistenceError::Duplicate`] if the key is already held.
    pub fn reserve(&mut self, reservation: Reservation) {
        self.reservations.push(reservation);
    }

    pub fn tracked(&self) -> impl Iterator<Item = &dyn TrackedAggregate> {
        self.tracked.iter().map(|aggregate| &**aggregate)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Total buffered events across tracked aggregates.
    pub fn pending_events(&self) -> usize {
        self.tracked.iter().map(|a| a.pending_events()).sum()
    }

    /// Stamps, commits and, on success, runs the commit hook.
    ///
    /// Returns the number of events the hook published. Cancellation is
    /// honoured only before the store write starts.
    #[tracing::instrument(
        skip_all,
        fields(aggregates = self.tracked.len(), actor = %ctx.actor)
    )]
    pub async fn commit(mut self, ctx: &CommitContext) -> Result<usize> {
        if self.tracked.is_empty() && self.reservations.is_empty() {
            return Ok(0);
        }
        if ctx.is_cancelled() {
            return Err(PersistenceError::Cancelled);
        }

        let stamp = AuditStamp::now(ctx.actor.clone());
        let mut changes = Vec::with_capacity(self.tracked.len());
        for aggregate in self.tracked.iter_mut() {
            aggregate.apply_stamp(&stamp);
            let expected = aggregate.loaded_version();
            changes.push(RecordChange::new(aggregate.to_record(expected.next())?, expected));
        }
        for reservation in &self.reservations {
            changes.push(RecordChange::new(reservation.to_record()?, Version::initial()));
        }

        if let Err(e) = self.store.commit(changes).await {
            let e = self.explain(e);
            metrics::counter!("unit_of_work_commits_total", "outcome" => "failure").increment(1);
            tracing::warn!(error = %e, "commit failed, discarding buffered events");
            return Err(e);
        }
        metrics::counter!("unit_of_work_commits_total", "outcome" => "success").increment(1);

        for aggregate in self.tracked.iter_mut() {
            let committed = aggregate.loaded_version().next();
            aggregate.mark_committed(committed);
        }

        let published = self.hook.after_commit(&mut self.tracked, ctx).await;
        tracing::debug!(published, "commit complete");
        Ok(published)
    }

    /// Reports a version clash on one of this commit's reservations as a duplicate key.
    fn explain(&self, error: PersistenceError) -> PersistenceError {
        if let PersistenceError::Concurrency {
            aggregate_type,
            aggregate_id,
            ..
        } = &error
            && aggregate_type == RESERVATION_TYPE
            && let Some(reservation) = self.reservations.iter().find(|r| r.id() == *aggregate_id)
        {
            return PersistenceError::Duplicate {
                scope: reservation.scope.clone(),
                key: reservation.key.clone(),
            };
        }
        error
    }
}
