use std::sync::Arc;

use domain::Aggregate;

use crate::interceptor::{CommitHook, CommitInterceptor};
use crate::publisher::EventPublisher;
use crate::Result;
use crate::repository::Repository;
use crate::reservation::{RESERVATION_TYPE, Reservation};
use crate::store::Store;
use crate::unit_of_work::UnitOfWork;

/// Entry point handlers use to read aggregates and start units of work.
#[derive(Clone)]
pub struct Database<S> {
    store: S,
    hook: Arc<dyn CommitHook>,
}

impl<S: Store + Clone> Database<S> {
    pub fn new(store: S, hook: Arc<dyn CommitHook>) -> Self {
        Self { store, hook }
    }

    /// Uses a [`CommitInterceptor`] over `publisher` as the commit hook.
    pub fn with_publisher(store: S, publisher: Arc<dyn EventPublisher>) -> Self {
        Self::new(store, Arc::new(CommitInterceptor::new(publisher)))
    }

    pub fn repository<A: Aggregate>(&self) -> Repository<S, A> {
        Repository::new(self.store.clone())
    }

    /// Starts an empty unit of work.
    pub fn begin(&self) -> UnitOfWork<S> {
        UnitOfWork::new(self.store.clone(), Arc::clone(&self.hook))
    }

    /// Returns the current holder of `key` within `scope`, if any.
    pub async fn reservation(&self, scope: &str, key: &str) -> Result<Option<Reservation>> {
        match self
            .store
            .load(RESERVATION_TYPE, Reservation::record_id(scope, key))
            .await?
        {
            Some(record) => Ok(Some(Reservation::from_record(record)?)),
            None => Ok(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
