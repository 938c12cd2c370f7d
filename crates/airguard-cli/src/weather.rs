//! Weather snapshots from Open-Meteo, with an offline simulator.
//!
//! Fetch failures are reported to the caller, who degrades to scoring
//! without weather (the engine treats a missing snapshot as flyable).

use airguard_core::models::{WeatherCondition, WeatherSnapshot};
use anyhow::{anyhow, bail};
use chrono::Utc;
use rand::Rng;

pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Wind speed at or above which conditions are considered unflyable, km/h.
const MAX_FLYABLE_WIND_KMH: f64 = 28.0;
/// Minimum visibility for flyable conditions, km.
const MIN_FLYABLE_VISIBILITY_KM: f64 = 3.0;

#[derive(Debug, serde::Deserialize)]
struct ForecastResponse {
    current: Option<CurrentBlock>,
}

#[derive(Debug, serde::Deserialize)]
struct CurrentBlock {
    wind_speed_10m: Option<f64>,
    visibility: Option<f64>,
    weather_code: Option<u16>,
}

/// Map a WMO weather code to the engine's condition classes.
pub fn condition_from_weather_code(code: u16) -> WeatherCondition {
    match code {
        0 | 1 => WeatherCondition::Clear,
        2 | 3 | 45 | 48 => WeatherCondition::Cloudy,
        51..=67 | 71..=77 | 80..=86 => WeatherCondition::Rain,
        95..=99 => WeatherCondition::Storm,
        _ => WeatherCondition::Cloudy,
    }
}

/// Go/no-go rule: storms, high wind or poor visibility ground the drone.
pub fn is_flyable(condition: WeatherCondition, wind_kmh: f64, visibility_km: f64) -> bool {
    condition != WeatherCondition::Storm
        && wind_kmh < MAX_FLYABLE_WIND_KMH
        && visibility_km >= MIN_FLYABLE_VISIBILITY_KM
}

/// Fetch the current weather at a position from Open-Meteo.
pub async fn fetch_current(
    client: &reqwest::Client,
    url: &str,
    lat: f64,
    lng: f64,
) -> anyhow::Result<WeatherSnapshot> {
    let response = client
        .get(url)
        .query(&[
            ("latitude", lat.to_string()),
            ("longitude", lng.to_string()),
            (
                "current",
                "wind_speed_10m,visibility,weather_code".to_string(),
            ),
            ("windspeed_unit", "kmh".to_string()),
            ("timezone", "UTC".to_string()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        bail!("weather provider HTTP {}", response.status());
    }

    let payload: ForecastResponse = response.json().await?;
    let current = payload
        .current
        .ok_or_else(|| anyhow!("weather response missing current block"))?;

    let wind_speed_kmh = current.wind_speed_10m.unwrap_or(0.0);
    // Open-Meteo reports visibility in meters; missing values assume clear air.
    let visibility_km = current.visibility.map(|m| m / 1000.0).unwrap_or(10.0);
    let condition = condition_from_weather_code(current.weather_code.unwrap_or(0));

    Ok(WeatherSnapshot {
        wind_speed_kmh,
        visibility_km,
        condition,
        flyable: is_flyable(condition, wind_speed_kmh, visibility_km),
        observed_at: Utc::now(),
    })
}

/// Offline generator for demos and tests.
pub fn simulated(rng: &mut impl Rng) -> WeatherSnapshot {
    let wind_speed_kmh = rng.random_range(0.0..35.0);
    let visibility_km = rng.random_range(0.0..12.0);
    let condition = if wind_speed_kmh > 30.0 {
        WeatherCondition::Storm
    } else if wind_speed_kmh > 20.0 {
        WeatherCondition::Cloudy
    } else {
        WeatherCondition::Clear
    };

    WeatherSnapshot {
        wind_speed_kmh,
        visibility_km,
        condition,
        flyable: is_flyable(condition, wind_speed_kmh, visibility_km),
        observed_at: Utc::now(),
    }
}
