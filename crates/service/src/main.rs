//! Reference-data service entry point.

use service::{Config, ReferenceDataService, telemetry};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = Config::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    telemetry::init_tracing(&config.log_level, config.log_format)
        .expect("failed to initialize tracing");

    // 3. Install Prometheus recorder with its scrape listener
    telemetry::init_metrics(config.metrics_addr)
        .expect("failed to install Prometheus recorder");
    tracing::info!(addr = %config.metrics_addr, "metrics listener started");

    // 4. Assemble the service
    let service = ReferenceDataService::from_config(&config)
        .await
        .expect("failed to assemble service");

    // 5. Start background maintenance
    let shutdown = CancellationToken::new();
    let janitor = service.spawn_cache_janitor(config.cache_purge_interval, shutdown.clone());

    tracing::info!(
        actor = %config.service_actor,
        query_cache_ttl_secs = config.query_cache_ttl.as_secs(),
        "reference-data service ready"
    );

    // 6. Run until signalled
    shutdown_signal().await;
    shutdown.cancel();

    if let Some(janitor) = janitor
        && let Err(err) = janitor.await
    {
        tracing::warn!(error = %err, "cache janitor ended abnormally");
    }

    tracing::info!("service shut down gracefully");
}
