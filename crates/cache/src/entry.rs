use tokio::time::Instant;

/// A cached value with its absolute expiry.
///
/// Entries are never updated in place: a newer value replaces the whole
/// entry, and invalidation drops it.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Namespaced key, e.g. `Corridor_<id>`.
    pub key: String,

    /// Serialized value.
    pub value: String,

    /// Instant after which the entry is treated as absent.
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: String, expires_at: Instant) -> Self {
        Self {
            key: key.into(),
            value,
            expires_at,
        }
    }

    /// Returns true once `now` has reached the expiry instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
