//! Reference-data service.
//!
//! Wires the in-memory store, the query cache, the event publisher and the
//! request dispatcher from a [`Config`], and exposes a single entry point,
//! [`ReferenceDataService::send`], for transport adapters.

pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use cache::{CacheError, CacheStore, InMemoryCacheClient};
use common::Actor;
use persistence::{AuditLogSubscriber, Database, InMemoryStore, SubscriberFanout};
use pipeline::{ConfigurationError, Request, RequestContext, RequestDispatcher};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use config::{CacheBackend, Config, ConfigError, LogFormat};
pub use error::ErrorResponse;

/// Startup failures.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Dispatcher wiring error: {0}")]
    Wiring(#[from] ConfigurationError),

    #[error("CACHE_BACKEND=redis requires the `redis` feature")]
    RedisDisabled,
}

/// The assembled service.
#[derive(Clone)]
pub struct ReferenceDataService {
    dispatcher: Arc<RequestDispatcher>,
    db: Database<InMemoryStore>,
    memory_cache: Option<InMemoryCacheClient>,
    actor: Actor,
}

impl ReferenceDataService {
    /// Builds the service with the audit-log subscriber only.
    pub async fn from_config(config: &Config) -> Result<Self, ServiceError> {
        Self::with_subscribers(config, SubscriberFanout::new().with(AuditLogSubscriber)).await
    }

    /// Builds the service publishing committed events to `subscribers`.
    #[tracing::instrument(skip_all, fields(backend = ?config.cache_backend))]
    pub async fn with_subscribers(
        config: &Config,
        subscribers: SubscriberFanout,
    ) -> Result<Self, ServiceError> {
        refdata::set_query_cache_ttl(config.query_cache_ttl);

        let (cache, memory_cache) = build_cache(&config.cache_backend).await?;

        let db = Database::with_publisher(InMemoryStore::new(), Arc::new(subscribers));

        let mut builder = RequestDispatcher::builder().cache(cache);
        refdata::register(&mut builder, db.clone())?;
        let dispatcher = builder.build()?;

        tracing::info!(?dispatcher, "reference-data service assembled");

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            db,
            memory_cache,
            actor: config.service_actor.clone(),
        })
    }

    /// A fresh context acting as the configured service actor.
    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.actor.clone())
    }

    /// Dispatches `request` and maps any failure to its transport view.
    pub async fn send<R: Request>(
        &self,
        request: R,
        ctx: &RequestContext,
    ) -> Result<R::Response, ErrorResponse> {
        self.dispatcher
            .send(request, ctx)
            .await
            .map_err(ErrorResponse::from)
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub fn database(&self) -> &Database<InMemoryStore> {
        &self.db
    }

    /// The in-memory cache client, when that backend is in use.
    pub fn memory_cache(&self) -> Option<&InMemoryCacheClient> {
        self.memory_cache.as_ref()
    }

    /// Spawns a task purging expired in-memory cache entries every `interval`
    /// until `shutdown` is cancelled. Returns `None` for other backends.
    pub fn spawn_cache_janitor(
        &self,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let client = self.memory_cache.clone()?;
        Some(tokio::spawn(run_cache_janitor(client, interval, shutdown)))
    }
}

async fn build_cache(
    backend: &CacheBackend,
) -> Result<(CacheStore, Option<InMemoryCacheClient>), ServiceError> {
    match backend {
        CacheBackend::Memory => {
            let client = InMemoryCacheClient::new();
            Ok((CacheStore::new(client.clone()), Some(client)))
        }
        #[cfg(feature = "redis")]
        CacheBackend::Redis { url } => {
            let client = cache::RedisCacheClient::connect(url).await?;
            Ok((CacheStore::new(client), None))
        }
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis { .. } => Err(ServiceError::RedisDisabled),
    }
}

async fn run_cache_janitor(
    client: InMemoryCacheClient,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let purged = client.purge_expired().await;
                if purged > 0 {
                    metrics::counter!("cache_purged_entries_total").increment(purged as u64);
                    tracing::debug!(purged, "purged expired cache entries");
                }
            }
        }
    }

    tracing::debug!("cache janitor stopped");
}
