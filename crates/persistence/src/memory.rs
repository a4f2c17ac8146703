use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use common::{AggregateId, Version};
use tokio::sync::RwLock;

use crate::store::{RecordChange, Store, StoredRecord};
use crate::{PersistenceError, Result};

type RecordKey = (String, AggregateId);

/// In-memory store implementation for tests and single-process deployments.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<RecordKey, StoredRecord>>>,
    fail_next_commit: Arc<AtomicBool>,
    commits: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `commit` fail with `Unavailable` without writing anything.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Number of commits that were applied.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn load(
        &self,
        aggregate_type: &str,
        aggregate_id: AggregateId,
    ) -> Result<Option<StoredRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(aggregate_type.to_string(), aggregate_id))
            .cloned())
    }

    async fn load_all(&self, aggregate_type: &str) -> Result<Vec<StoredRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<_> = records
            .values()
            .filter(|r| r.aggregate_type == aggregate_type)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.aggregate_id);
        Ok(matching)
    }

    async fn commit(&self, changes: Vec<RecordChange>) -> Result<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "injected commit failure".to_string(),
            ));
        }

        let mut records = self.records.write().await;

        // Check every version before writing anything
        for change in &changes {
            let key = (
                change.record.aggregate_type.clone(),
                change.record.aggregate_id,
            );
            let actual = records
                .get(&key)
                .map(|r| r.version)
                .unwrap_or(Version::initial());
            if actual != change.expected {
                return Err(PersistenceError::Concurrency {
                    aggregate_type: change.record.aggregate_type.clone(),
                    aggregate_id: change.record.aggregate_id,
                    expected: change.expected,
                    actual,
                });
            }
        }

        for change in changes {
            let key = (
                change.record.aggregate_type.clone(),
                change.record.aggregate_id,
            );
            records.insert(key, change.record);
        }
        self.commits.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }
}
