use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Whether a request mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Command,
    Query,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Command => "command",
            RequestKind::Query => "query",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where and for how long a query result may be cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Deterministic key for the logical query, namespaced by entity prefix.
    pub key: String,
    pub ttl: Duration,
}

impl CachePolicy {
    pub fn new(key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            ttl,
        }
    }
}

/// One intended operation, answered by exactly one handler.
pub trait Request: Send + 'static {
    /// The value a successful handler returns.
    ///
    /// Serializable so cached queries can be stored and replayed.
    type Response: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Name used in logs and metrics.
    const NAME: &'static str;

    const KIND: RequestKind;

    /// Cache-aside policy for queries. `None` disables caching.
    fn cache_policy(&self) -> Option<CachePolicy> {
        None
    }

    /// Cache key prefix to drop after this command succeeds.
    fn invalidates(&self) -> Option<&'static str> {
        None
    }
}
