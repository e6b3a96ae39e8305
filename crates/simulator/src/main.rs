//! IoT sensor simulator entry point.
//!
//! Independent process posting plausible readings to the ingest API on a
//! fixed interval. A failed send is logged and simply retried on the next
//! tick, never escalated.

mod generator;

use anyhow::Result;
use common::Reading;
use std::env;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Read configuration from environment
    let ingest_url =
        env::var("INGEST_URL").unwrap_or_else(|_| "http://localhost:5000/data".to_string());
    let device_id = env::var("DEVICE_ID").unwrap_or_else(|_| "sensor-001".to_string());
    let send_interval_secs: u64 = env::var("SEND_INTERVAL_SECS")
        .unwrap_or_else(|_| "3".to_string())
        .parse()
        .expect("SEND_INTERVAL_SECS must be a number");

    info!("Starting IoT sensor simulation");
    info!("  INGEST_URL: {}", ingest_url);
    info!("  DEVICE_ID: {}", device_id);
    info!("  SEND_INTERVAL_SECS: {}", send_interval_secs);

    let http = reqwest::Client::new();
    let mut tick = tokio::time::interval(Duration::from_secs(send_interval_secs));

    loop {
        tokio::select! {
            _ = tick.tick() => {
                send_reading(&http, &ingest_url, &device_id).await;
            }
            _ = signal::ctrl_c() => {
                info!("Stopping IoT sensor simulation");
                break;
            }
        }
    }

    Ok(())
}

/// Generate and post one reading. Errors are logged only; the next tick
/// is the retry.
async fn send_reading(http: &reqwest::Client, ingest_url: &str, device_id: &str) {
    let reading = generator::generate_reading(device_id);

    match http.post(ingest_url).json(&reading).send().await {
        Ok(response) if response.status().is_success() => {
            match response.json::<Reading>().await {
                Ok(stored) => info!(
                    "Sent reading {}: {:.1}C {:.1}% ({})",
                    stored.id, stored.temperature, stored.humidity, stored.device_id
                ),
                Err(e) => error!("Failed to parse ingest response: {}", e),
            }
        }
        Ok(response) => {
            error!(
                "Ingest API rejected reading: status {}",
                response.status()
            );
        }
        Err(e) => error!("Failed to send reading: {}", e),
    }
}
