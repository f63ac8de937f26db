//! Marketplace integration service.
//!
//! Wires the store pool, the procurement gateway client, the lifecycle
//! reconciler, the HTTP surface, and (with the `kafka` feature) the event
//! subscriber. All handles are constructed here and passed down
//! explicitly; there are no ambient singletons.

mod config;
#[cfg(feature = "kafka")]
mod consumers;
mod error;
mod openapi;
mod router;
mod routes;
mod state;

use config::Config;
use portside_procurement::HttpProcurementClient;
use portside_reconciler::Reconciler;
use state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        http_addr = %config.http_addr,
        "Starting portside"
    );

    let pool = portside_db::connect(&config.database_url, config.db_max_connections)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Database error: {e}");
            std::process::exit(1);
        });

    portside_db::run_migrations(&pool).await.unwrap_or_else(|e| {
        eprintln!("Migration error: {e}");
        std::process::exit(1);
    });

    let gateway = HttpProcurementClient::new(
        &config.procurement_base_url,
        &config.procurement_provider_id,
        &config.procurement_api_key,
        Duration::from_secs(config.procurement_timeout_secs),
    )
    .unwrap_or_else(|e| {
        eprintln!("Procurement client error: {e}");
        std::process::exit(1);
    });

    let reconciler = Reconciler::new(pool.clone(), Arc::new(gateway));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    #[cfg(feature = "kafka")]
    let subscriber_handle = {
        let kafka_config = portside_events::KafkaConfig::from_env().unwrap_or_else(|e| {
            eprintln!("Kafka configuration error: {e}");
            std::process::exit(1);
        });
        consumers::start(&kafka_config, reconciler.clone(), shutdown_rx.clone()).unwrap_or_else(
            |e| {
                eprintln!("Subscriber error: {e}");
                std::process::exit(1);
            },
        )
    };
    #[cfg(not(feature = "kafka"))]
    let _ = &shutdown_rx;

    let app = router::app_router(AppState {
        pool,
        reconciler,
    });

    let listener = tokio::net::TcpListener::bind(&config.http_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Failed to bind {}: {e}", config.http_addr);
            std::process::exit(1);
        });

    info!(http_addr = %config.http_addr, "HTTP server listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {e}");
    }

    // Stop pulling new messages; the subscriber finishes its in-flight
    // message before the task resolves.
    let _ = shutdown_tx.send(true);
    #[cfg(feature = "kafka")]
    let _ = subscriber_handle.await;

    info!("Shutdown complete");
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
