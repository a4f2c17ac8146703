//! Service configuration loaded from environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use common::Actor;
use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("{0} is required when CACHE_BACKEND=redis")]
    Missing(&'static str),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err("expected `pretty` or `json`"),
        }
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis { url: String },
}

/// Service configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
/// - `CACHE_BACKEND`: `memory` or `redis` (default: `memory`)
/// - `REDIS_URL`: required for the redis backend
/// - `CACHE_PURGE_INTERVAL_SECS`: in-memory janitor period (default: `60`)
/// - `QUERY_CACHE_TTL_SECS`: lifetime of cached query results (default: `300`)
/// - `METRICS_ADDR`: Prometheus scrape listener (default: `0.0.0.0:9000`)
/// - `SERVICE_ACTOR`: actor stamped on requests issued by the service itself
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub cache_backend: CacheBackend,
    pub cache_purge_interval: Duration,
    pub query_cache_ttl: Duration,
    pub metrics_addr: SocketAddr,
    pub service_actor: Actor,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_level = lookup("RUST_LOG").unwrap_or(defaults.log_level);

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                var: "LOG_FORMAT",
                value,
                reason,
            })?,
            None => defaults.log_format,
        };

        let cache_backend = match lookup("CACHE_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => CacheBackend::Memory,
            Some("redis") => CacheBackend::Redis {
                url: lookup("REDIS_URL").ok_or(ConfigError::Missing("REDIS_URL"))?,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "CACHE_BACKEND",
                    value: other.to_string(),
                    reason: "expected `memory` or `redis`",
                });
            }
        };

        let cache_purge_interval = match lookup("CACHE_PURGE_INTERVAL_SECS") {
            Some(value) => positive_secs("CACHE_PURGE_INTERVAL_SECS", value)?,
            None => defaults.cache_purge_interval,
        };

        let query_cache_ttl = match lookup("QUERY_CACHE_TTL_SECS") {
            Some(value) => positive_secs("QUERY_CACHE_TTL_SECS", value)?,
            None => defaults.query_cache_ttl,
        };

        let metrics_addr = match lookup("METRICS_ADDR") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "METRICS_ADDR",
                value,
                reason: "expected a socket address such as 0.0.0.0:9000",
            })?,
            None => defaults.metrics_addr,
        };

        let service_actor = lookup("SERVICE_ACTOR")
            .filter(|actor| !actor.trim().is_empty())
            .map(Actor::new)
            .unwrap_or(defaults.service_actor);

        Ok(Self {
            log_level,
            log_format,
            cache_backend,
            cache_purge_interval,
            query_cache_ttl,
            metrics_addr,
            service_actor,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            cache_backend: CacheBackend::Memory,
            cache_purge_interval: Duration::from_secs(60),
            query_cache_ttl: Duration::from_secs(300),
            metrics_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            service_actor: Actor::system(),
        }
    }
}

fn positive_secs(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            reason: "expected a positive number of seconds",
        }),
    }
}
