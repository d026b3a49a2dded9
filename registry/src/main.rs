use clap::Parser;
use registry::config::Config;
use registry::db::{self, DeviceStore, PgDeviceStore};
use registry::errors::Error;
use registry::{metrics, model, rest};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run(config).await {
        error!("Device registry failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting device registry");
    info!("HTTP server: {}", config.http_addr());
    info!("Database: {}", config.database_display());

    metrics::init_metrics().map_err(Error::from)?;

    let pool = db::make_pool(&config).await?;
    let store = Arc::new(PgDeviceStore::new(pool.clone()));

    let seeded = store.seed_if_empty(&model::seed_devices()).await?;
    if seeded > 0 {
        info!("Seeded {} devices into empty table", seeded);
    }

    let app = rest::create_router(store).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.http_addr()).await?;
    info!("HTTP server listening on {}", config.http_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
