//! Optional in-process sensor simulation.
//!
//! Generates a plausible reading on a fixed interval and feeds it through
//! the same ingest pipeline as `POST /data`, so simulated readings are
//! stored, trimmed, and broadcast exactly like external ones. A failed
//! tick is logged and simply retried on the next one.

use crate::api::AppState;
use crate::ingest;
use common::NewReading;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Spawn the simulation task. Caller decides whether to run it at all
/// (interval 0 disables it upstream).
pub fn spawn(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Sensor simulation started (interval: {}s)",
            interval.as_secs()
        );
        loop {
            tokio::time::sleep(interval).await;

            let reading = generate_reading();
            match ingest::ingest(&state.store, &state.registry, reading).await {
                Ok(stored) => {
                    debug!(
                        "Simulated reading {}: {:.1}C {:.1}%",
                        stored.id, stored.temperature, stored.humidity
                    );
                }
                Err(e) => error!("Failed to store simulated reading: {}", e),
            }
        }
    })
}

/// Uniform plausible values: 10-40 degrees C, 20-80 percent humidity,
/// one decimal place.
fn generate_reading() -> NewReading {
    let mut rng = rand::thread_rng();
    let temperature = rng.gen_range(10.0..40.0_f64);
    let humidity = rng.gen_range(20.0..80.0_f64);

    NewReading {
        temperature: round_tenth(temperature),
        humidity: round_tenth(humidity),
        device_id: None,
        timestamp: None,
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::DEFAULT_DEVICE_ID;

    #[test]
    fn test_generated_values_stay_in_range() {
        for _ in 0..1000 {
            let reading = generate_reading();
            assert!((10.0..=40.0).contains(&reading.temperature));
            assert!((20.0..=80.0).contains(&reading.humidity));
        }
    }

    #[test]
    fn test_generated_values_have_one_decimal() {
        for _ in 0..100 {
            let reading = generate_reading();
            assert_eq!(round_tenth(reading.temperature), reading.temperature);
            assert_eq!(round_tenth(reading.humidity), reading.humidity);
        }
    }

    #[test]
    fn test_generated_reading_uses_default_device() {
        let reading = generate_reading();
        assert_eq!(reading.into_reading().device_id, DEFAULT_DEVICE_ID);
    }
}
