use clap::Parser;
use std::sync::Arc;
use telemetry::config::Config;
use telemetry::errors::Error;
use telemetry::store::TelemetryLog;
use telemetry::{metrics, rest};
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
        error!("Telemetry service failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("Starting telemetry intake service");

    metrics::init_metrics().map_err(Error::from)?;

    let log = Arc::new(TelemetryLog::new());
    let app = rest::create_router(log.clone()).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.http_addr()).await?;
    info!("HTTP server listening on {}", config.http_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down, {} telemetry records discarded", log.len());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
