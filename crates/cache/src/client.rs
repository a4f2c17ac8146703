use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// A TTL key-value backend.
///
/// Implementations are shared between concurrent requests and must be
/// thread-safe. Writes are last-write-wins; no compare-and-swap is offered
/// because cached values are derived from the durable store.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value, for `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Removes a single key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes every key starting with `prefix` and returns how many were removed.
    ///
    /// Readers running concurrently may still observe entries that are being
    /// removed; the removal only has to become visible eventually.
    async fn remove_by_prefix(&self, prefix: &str) -> Result<u64>;
}

#[async_trait]
impl<T: CacheClient + ?Sized> CacheClient for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key).await
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Result<u64> {
        (**self).remove_by_prefix(prefix).await
    }
}
