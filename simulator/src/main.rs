mod telemetry;

use clap::Parser;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use telemetry::{generate_reading, sensor_for, Reading};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Periodically submits simulated sensor readings to the telemetry intake service
#[derive(Debug, Clone, Parser)]
#[command(name = "simulator", version)]
struct Args {
    /// Base URL of the telemetry service
    #[arg(long, env = "TELEMETRY_URL", default_value = "http://localhost:5001")]
    telemetry_url: String,

    /// Seconds between readings
    #[arg(long, env = "INTERVAL_SECS", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    interval_secs: u64,

    /// Number of simulated sensors
    #[arg(long, env = "DEVICES", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    devices: u32,

    /// Wait before the first reading so the target service can start
    #[arg(long, env = "STARTUP_DELAY_SECS", default_value_t = 0)]
    startup_delay_secs: u64,

    /// Stop after this many readings
    #[arg(long, env = "COUNT")]
    count: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting device simulator");
    info!(
        "Target: {}, Interval: {}s, Devices: {}",
        args.telemetry_url, args.interval_secs, args.devices
    );

    if args.startup_delay_secs > 0 {
        info!("Waiting {}s before first reading", args.startup_delay_secs);
        tokio::time::sleep(Duration::from_secs(args.startup_delay_secs)).await;
    }

    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    let url = format!("{}/telemetry", args.telemetry_url.trim_end_matches('/'));
    let mut rng = rand::thread_rng();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs));
    let mut sent = 0u64;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("Received shutdown signal");
                break;
            }
        }

        let reading = generate_reading(&mut rng, sensor_for(sent, args.devices));
        match publish(&client, &url, &reading).await {
            Ok(Some(total)) => info!(
                "Sent telemetry: sensor {} value {} (service holds {})",
                reading.sensor_id, reading.value, total
            ),
            Ok(None) => info!(
                "Sent telemetry: sensor {} value {}",
                reading.sensor_id, reading.value
            ),
            Err(e) => warn!("Failed to publish reading: {}", e),
        }
        sent += 1;

        if args.count.is_some_and(|max| sent >= max) {
            break;
        }
    }

    info!("Simulator stopped after {} readings", sent);
    Ok(())
}

/// Posts one reading. Returns the service's running count when it reports one.
async fn publish(client: &Client, url: &str, reading: &Reading) -> reqwest::Result<Option<u64>> {
    let body: Value = client
        .post(url)
        .json(reading)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(body.get("count").and_then(Value::as_u64))
}
