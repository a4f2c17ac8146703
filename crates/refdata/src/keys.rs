//! Cache key namespaces and query cache lifetime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Prefix of every cached zone query.
pub const ZONE_PREFIX: &str = "Zone_";

/// Prefix of every cached corridor query.
pub const CORRIDOR_PREFIX: &str = "Corridor_";

const DEFAULT_QUERY_CACHE_TTL_SECS: u64 = 300;

static QUERY_CACHE_TTL_SECS: AtomicU64 = AtomicU64::new(DEFAULT_QUERY_CACHE_TTL_SECS);

/// How long cacheable queries keep their results.
pub fn query_cache_ttl() -> Duration {
    Duration::from_secs(QUERY_CACHE_TTL_SECS.load(Ordering::Relaxed))
}

/// Overrides the query cache lifetime. A zero duration is ignored.
pub fn set_query_cache_ttl(ttl: Duration) {
    if ttl.is_zero() {
        tracing::warn!("ignoring zero query cache ttl");
        return;
    }
    QUERY_CACHE_TTL_SECS.store(ttl.as_secs().max(1), Ordering::Relaxed);
}
