//! Courier tracking service
//!
//! Ingests courier GPS location updates over HTTP and derives two facts per
//! courier: cumulative distance traveled and a deduplicated log of store
//! entrance events.
//!
//! Module structure:
//! - `domain/` - Core business types (LocationUpdate, Store, geo)
//! - `io/` - External interfaces (HTTP API, store catalog)
//! - `services/` - Business logic (Dispatcher, TrackStore, EntranceLog)
//! - `infra/` - Infrastructure (Config, Metrics)

use clap::Parser;
use courier_tracker::infra::{Config, Metrics};
use courier_tracker::io::StoreCatalog;
use courier_tracker::services::{CourierTrackStore, EntranceLogStore, LocationDispatcher};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Courier tracking - location ingest, distance, and store entrance service
#[derive(Parser, Debug)]
#[command(name = "courier-tracker", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize structured logging with configurable level via RUST_LOG env var
    // Default: INFO, use RUST_LOG=debug for per-update visibility
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!("courier-tracker starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        http_port = %config.http_port(),
        stores_file = %config.stores_file(),
        entrance_radius_m = %config.entrance_radius_m(),
        entrance_cooldown_secs = %config.entrance_cooldown_secs(),
        metrics_interval_secs = %config.metrics_interval_secs(),
        "config_loaded"
    );

    // Store catalog load failure is fatal: the service is useless without it
    let catalog = Arc::new(StoreCatalog::from_file(config.stores_file())?);

    let metrics = Arc::new(Metrics::new());
    let dispatcher = Arc::new(LocationDispatcher::new(
        catalog,
        Arc::new(CourierTrackStore::new()),
        Arc::new(EntranceLogStore::new(config.entrance_cooldown_secs())),
        metrics.clone(),
        config.entrance_radius_m(),
    ));

    // Create shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start metrics reporter
    let reporter_metrics = metrics.clone();
    let reporter_dispatcher = dispatcher.clone();
    let metrics_interval = config.metrics_interval_secs();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(metrics_interval));
        loop {
            interval.tick().await;
            let summary = reporter_metrics.report(reporter_dispatcher.courier_count());
            summary.log();
        }
    });

    // Handle shutdown on Ctrl+C
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown_signal_received");
        let _ = shutdown_tx.send(true);
    });

    // Run the HTTP API server until shutdown
    courier_tracker::io::http::start_api_server(
        config.http_port(),
        dispatcher,
        metrics,
        config.site_id().to_string(),
        shutdown_rx,
    )
    .await?;

    info!("courier-tracker shutdown complete");
    Ok(())
}
