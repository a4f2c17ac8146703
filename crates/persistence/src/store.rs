use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, Version};
use serde::{Deserialize, Serialize};

use crate::Result;

/// Persisted state of one aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub aggregate_type: String,
    pub aggregate_id: AggregateId,
    pub version: Version,
    pub state: serde_json::Value,
}

/// One write in an atomic commit.
///
/// `expected` is the version the writer loaded; [`Version::initial`] means
/// the record must not exist yet. `record.version` is the version being
/// written.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordChange {
    pub record: StoredRecord,
    pub expected: Version,
}

impl RecordChange {
    pub fn new(record: StoredRecord, expected: Version) -> Self {
        Self { record, expected }
    }
}

/// Core trait for state store implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Store: Send + Sync {
    /// Loads one record, or `None` if it was never committed.
    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
    ) -> Result<Option<StoredRecord>>;

    /// Loads every record of a type, ordered by aggregate id.
    async fn load_all(&self, aggregate_type: &str) -> Result<Vec<StoredRecord>>;

    /// Applies all changes atomically - either all succeed or none do.
    ///
    /// Fails with `Concurrency` if any record's current version differs
    /// from its change's `expected` version.
    async fn commit(&self, changes: Vec<RecordChange>) -> Result<()>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
    ) -> Result<Option<StoredRecord>> {
        (**self).load(aggregate_type, aggregate_id).await
    }

    async fn load_all(&self, aggregate_type: &str) -> Result<Vec<StoredRecord>> {
        (**self).load_all(aggregate_type).await
    }

    async fn commit(&self, changes: Vec<RecordChange>) -> Result<()> {
        (**self).commit(changes).await
    }
}
