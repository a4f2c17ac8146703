use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{CacheClient, InMemoryCacheClient};

/// Soft-failing cache facade used by the request pipeline.
///
/// Every backend error is logged and absorbed: reads degrade to a miss and
/// writes to a no-op, so an unreachable cache only costs recomputation.
#[derive(Clone)]
pub struct CacheStore {
    client: Arc<dyn CacheClient>,
}

impl CacheStore {
    /// Creates a store over the given backend.
    pub fn new<C: CacheClient + 'static>(client: C) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Creates a store over an already shared backend.
    pub fn from_arc(client: Arc<dyn CacheClient>) -> Self {
        Self { client }
    }

    /// Creates a store over a fresh [`InMemoryCacheClient`].
    pub fn in_memory() -> Self {
        Self::new(InMemoryCacheClient::new())
    }

    /// Returns the raw value under `key`; errors count as a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        match self.client.get(key).await {
            Ok(Some(value)) => {
                metrics::counter!("cache_hits_total").increment(1);
                tracing::trace!(key, "cache hit");
                Some(value)
            }
            Ok(None) => {
                metrics::counter!("cache_misses_total").increment(1);
                tracing::trace!(key, "cache miss");
                None
            }
            Err(e) => {
                metrics::counter!("cache_errors_total", "op" => "get").increment(1);
                tracing::warn!(key, error = %e, "cache get failed, treating as miss");
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl`. A zero TTL stores nothing.
    pub async fn set(&self, key: &str, value: String, ttl: Duration) {
        if ttl.is_zero() {
            tracing::warn!(key, "refusing to cache with a zero ttl");
            return;
        }
        if let Err(e) = self.client.set(key, value, ttl).await {
            metrics::counter!("cache_errors_total", "op" => "set").increment(1);
            tracing::warn!(key, error = %e, "cache set failed, value not cached");
        }
    }

    pub async fn remove(&self, key: &str) {
        if let Err(e) = self.client.remove(key).await {
            metrics::counter!("cache_errors_total", "op" => "remove").increment(1);
            tracing::warn!(key, error = %e, "cache remove failed");
        }
    }

    /// Removes every entry under `prefix`, returning how many were removed
    /// (zero when the backend is unreachable).
    pub async fn remove_by_prefix(&self, prefix: &str) -> u64 {
        match self.client.remove_by_prefix(prefix).await {
            Ok(removed) => {
                metrics::counter!("cache_invalidations_total").increment(1);
                tracing::debug!(prefix, removed, "cache prefix invalidated");
                removed
            }
            Err(e) => {
                metrics::counter!("cache_errors_total", "op" => "remove_by_prefix").increment(1);
                tracing::warn!(prefix, error = %e, "cache prefix invalidation failed");
                0
            }
        }
    }

    /// Reads and decodes a JSON value. Undecodable payloads are evicted and
    /// reported as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "evicting undecodable cache entry");
                self.remove(key).await;
                None
            }
        }
    }

    /// Encodes `value` as JSON and stores it for `ttl`.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw, ttl).await,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache value could not be encoded");
            }
        }
    }
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}
