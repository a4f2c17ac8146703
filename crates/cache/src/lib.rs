//! Cache-aside storage for query results.
//!
//! This crate provides:
//! - [`CacheClient`] trait for TTL key-value backends
//! - [`InMemoryCacheClient`] for tests and single-node deployments
//! - `RedisCacheClient` behind the `redis` feature
//! - [`CacheStore`], the soft-failing facade the request pipeline talks to

pub mod client;
pub mod entry;
pub mod error;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_client;
pub mod store;

pub use client::CacheClient;
pub use entry::CacheEntry;
pub use error::{CacheError, Result};
pub use memory::InMemoryCacheClient;
#[cfg(feature = "redis")]
pub use redis_client::RedisCacheClient;
pub use store::CacheStore;
