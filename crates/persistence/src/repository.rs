use std::marker::PhantomData;

use common::AggregateId;
use domain::Aggregate;

use crate::Result;
use crate::store::{Store, StoredRecord};

/// Typed read access to one aggregate type.
///
/// Loaded aggregates carry the stored version so a later commit can detect
/// concurrent writers. Their event buffers start empty.
pub struct Repository<S, A> {
    store: S,
    _aggregate: PhantomData<fn() -> A>,
}

impl<S: Clone, A> Clone for Repository<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _aggregate: PhantomData,
        }
    }
}

impl<S: Store, A: Aggregate> Repository<S, A> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            _aggregate: PhantomData,
        }
    }

    /// Loads the aggregate with `id`, or `None` if it does not exist.
    #[tracing::instrument(skip(self), fields(aggregate_type = A::aggregate_type()))]
    pub async fn load(&self, id: AggregateId) -> Result<Option<A>> {
        match self.store.load(A::aggregate_type(), id).await? {
            Some(record) => Ok(Some(hydrate(record)?)),
            None => Ok(None),
        }
    }

    /// Loads every aggregate of this type, ordered by id.
    #[tracing::instrument(skip(self), fields(aggregate_type = A::aggregate_type()))]
    pub async fn load_all(&self) -> Result<Vec<A>> {
        self.store
            .load_all(A::aggregate_type())
            .await?
            .into_iter()
            .map(hydrate)
            .collect()
    }
}

fn hydrate<A: Aggregate>(record: StoredRecord) -> Result<A> {
    let mut aggregate: A = serde_json::from_value(record.state)?;
    aggregate.set_version(record.version);
    Ok(aggregate)
}
