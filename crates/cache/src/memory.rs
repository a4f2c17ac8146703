use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{CacheClient, CacheEntry, CacheError, Result};

/// In-memory cache backend.
///
/// Expired entries are hidden from readers immediately and reclaimed by
/// [`InMemoryCacheClient::purge_expired`]. The client can be switched
/// offline to simulate an unreachable backend.
#[derive(Clone, Default)]
pub struct InMemoryCacheClient {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryCacheClient {
    /// Creates a new empty in-memory cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with [`CacheError::Unavailable`]
    /// (or succeed again when `offline` is false).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns the number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if a live entry exists for `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Drops every expired entry and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable(
                "in-memory cache is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheClient for InMemoryCacheClient {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.ensure_online()?;
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.ensure_online()?;
        let entry = CacheEntry::new(key, value, Instant::now() + ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.ensure_online()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Result<u64> {
        self.ensure_online()?;
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = InMemoryCacheClient::new();
        cache.set("Zone_1", "eu".to_string(), TTL).await.unwrap();

        let value = cache.get("Zone_1").await.unwrap();
        assert_eq!(value.as_deref(), Some("eu"));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let cache = InMemoryCacheClient::new();
        assert!(cache.get("Zone_1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let cache = InMemoryCacheClient::new();
        cache.set("Zone_1", "first".to_string(), TTL).await.unwrap();
        cache.set("Zone_1", "second".to_string(), TTL).await.unwrap();

        assert_eq!(cache.get("Zone_1").await.unwrap().as_deref(), Some("second"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_disappears_after_ttl() {
        let cache = InMemoryCacheClient::new();
        cache
            .set("Zone_1", "eu".to_string(), Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.get("Zone_1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("Zone_1").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_expired_reclaims_only_expired_entries() {
        let cache = InMemoryCacheClient::new();
        cache
            .set("Zone_short", "a".to_string(), Duration::from_secs(1))
            .await
            .unwrap();
        cache.set("Zone_long", "b".to_string(), TTL).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.contains_key("Zone_long").await);
    }

    #[tokio::test]
    async fn remove_by_prefix_leaves_other_prefixes() {
        let cache = InMemoryCacheClient::new();
        cache.set("Corridor_1", "a".to_string(), TTL).await.unwrap();
        cache.set("Corridor_2", "b".to_string(), TTL).await.unwrap();
        cache.set("Zone_1", "c".to_string(), TTL).await.unwrap();

        let removed = cache.remove_by_prefix("Corridor_").await.unwrap();

        assert_eq!(removed, 2);
        assert!(!cache.contains_key("Corridor_1").await);
        assert!(!cache.contains_key("Corridor_2").await);
        assert!(cache.contains_key("Zone_1").await);
    }

    #[tokio::test]
    async fn remove_missing_key_is_ok() {
        let cache = InMemoryCacheClient::new();
        assert!(cache.remove("nothing").await.is_ok());
    }

    #[tokio::test]
    async fn offline_client_reports_unavailable() {
        let cache = InMemoryCacheClient::new();
        cache.set_offline(true);

        assert!(matches!(
            cache.get("Zone_1").await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(matches!(
            cache.set("Zone_1", "x".to_string(), TTL).await,
            Err(CacheError::Unavailable(_))
        ));

        cache.set_offline(false);
        assert!(cache.get("Zone_1").await.unwrap().is_none());
    }
}
