//! Plausible sensor value generation.
//!
//! Values center on a comfortable indoor baseline with random variation
//! plus a sinusoidal day/night temperature cycle, clamped to 10-40 degrees
//! C and 20-80 percent humidity, one decimal place.

use chrono::{Timelike, Utc};
use common::NewReading;
use rand::Rng;

const BASE_TEMPERATURE: f64 = 22.0;
const BASE_HUMIDITY: f64 = 45.0;

/// Generate one plausible reading for the given device.
pub fn generate_reading(device_id: &str) -> NewReading {
    let hour = Utc::now().hour();
    let mut rng = rand::thread_rng();

    // +-5C random variation plus a +-3C day/night cycle peaking mid-day.
    let temp_variation = (rng.gen::<f64>() - 0.5) * 10.0;
    let day_cycle = ((hour as f64 - 6.0) * std::f64::consts::PI / 12.0).sin() * 3.0;
    let temperature = (BASE_TEMPERATURE + temp_variation + day_cycle).clamp(10.0, 40.0);

    // +-10% random variation.
    let humidity_variation = (rng.gen::<f64>() - 0.5) * 20.0;
    let humidity = (BASE_HUMIDITY + humidity_variation).clamp(20.0, 80.0);

    NewReading {
        temperature: round_tenth(temperature),
        humidity: round_tenth(humidity),
        device_id: Some(device_id.to_string()),
        timestamp: Some(Utc::now()),
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
