use thiserror::Error;

/// Errors raised by cache backends.
///
/// These never reach a request's caller: [`crate::CacheStore`] absorbs them
/// and degrades to a miss or a no-op.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend could not be reached.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error reported by the Redis client.
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

/// Result type for cache backend operations.
pub type Result<T> = std::result::Result<T, CacheError>;
