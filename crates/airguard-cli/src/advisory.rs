//! Advisory briefings from an external assistant, failing soft.
//!
//! The engine has no contract with the assistant beyond plain text in, plain
//! text out. Missing credentials, HTTP failures and malformed responses all
//! degrade to a fixed fallback string; nothing here returns an error to the
//! caller.

use airguard_core::models::{Coordinate, DroneConfig, RiskResult, WeatherSnapshot};
use airguard_core::zones::ZoneCatalog;
use airguard_core::geo;

pub const FALLBACK_ADVISORY: &str =
    "Advisory service unavailable; review the listed violations and fly conservatively.";
pub const MISSING_KEY_ADVISORY: &str =
    "Set AIRGUARD_ADVISORY_KEY to enable advisory briefings.";

#[derive(Debug, serde::Serialize)]
struct CritiqueRequest<'a> {
    prompt: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct CritiqueResponse {
    text: Option<String>,
}

/// Assemble the plain-text context block handed to the assistant.
pub fn briefing_context(
    risk: &RiskResult,
    config: &DroneConfig,
    weather: Option<&WeatherSnapshot>,
    path: &[Coordinate],
    catalog: &ZoneCatalog,
) -> String {
    let warnings = if risk.violations.is_empty() {
        "None".to_string()
    } else {
        risk.violations.join(", ")
    };

    let weather_line = match weather {
        Some(w) => format!("{}, wind {:.0} km/h", w.condition, w.wind_speed_kmh),
        None => "not available".to_string(),
    };

    let breached: Vec<&str> = catalog
        .non_advisory()
        .filter(|zone| geo::path_intersects_polygon(path, &zone.boundary))
        .map(|zone| zone.name.as_str())
        .collect();
    let airspace_line = if breached.is_empty() {
        "clear of restricted areas".to_string()
    } else {
        format!("path enters {}", breached.join(", "))
    };

    format!(
        "Risk level: {:.0}%\n\
         Safety warnings: {warnings}\n\
         Drone: {} class at {:.0}m\n\
         Weather: {weather_line}\n\
         Airspace: {airspace_line}",
        risk.score, config.weight_class, config.altitude_m
    )
}

/// Ask the advisory endpoint for a critique of the current plan.
///
/// Always returns text; network or credential problems fall back to a fixed
/// message instead of surfacing as errors.
pub async fn request_critique(
    client: &reqwest::Client,
    endpoint: &str,
    api_key: Option<&str>,
    context: &str,
) -> String {
    let Some(api_key) = api_key else {
        return MISSING_KEY_ADVISORY.to_string();
    };

    let result = client
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&CritiqueRequest { prompt: context })
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            match response.json::<CritiqueResponse>().await {
                Ok(body) => body.text.unwrap_or_else(|| FALLBACK_ADVISORY.to_string()),
                Err(err) => {
                    tracing::warn!("advisory response malformed: {err}");
                    FALLBACK_ADVISORY.to_string()
                }
            }
        }
        Ok(response) => {
            tracing::warn!("advisory endpoint HTTP {}", response.status());
            FALLBACK_ADVISORY.to_string()
        }
        Err(err) => {
            tracing::warn!("advisory request failed: {err}");
            FALLBACK_ADVISORY.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airguard_core::models::{WeatherCondition, WeightClass};
    use chrono::Utc;

    #[test]
    fn context_includes_risk_and_airspace() {
        let risk = RiskResult {
            score: 100.0,
            violations: vec!["NFZ_BREACH: flight path enters no-fly zone X".to_string()],
        };
        let config = DroneConfig {
            altitude_m: 90.0,
            weight_class: WeightClass::Light,
        };
        // Path cutting through the KIA polygon in the built-in catalog.
        let path = vec![
            Coordinate::new(13.19, 77.70),
            Coordinate::new(13.21, 77.71),
        ];
        let catalog = ZoneCatalog::bengaluru();

        let context = briefing_context(&risk, &config, None, &path, &catalog);
        assert!(context.contains("Risk level: 100%"));
        assert!(context.contains("NFZ_BREACH"));
        assert!(context.contains("Kempegowda"));
        assert!(context.contains("Weather: not available"));
    }

    #[test]
    fn context_reports_clear_airspace_and_weather() {
        let risk = RiskResult::empty();
        let config = DroneConfig::default();
        let weather = WeatherSnapshot {
            wind_speed_kmh: 12.0,
            visibility_km: 9.0,
            condition: WeatherCondition::Clear,
            flyable: true,
            observed_at: Utc::now(),
        };
        let path = vec![Coordinate::new(12.80, 77.40), Coordinate::new(12.81, 77.41)];

        let context = briefing_context(
            &risk,
            &config,
            Some(&weather),
            &path,
            &ZoneCatalog::bengaluru(),
        );
        assert!(context.contains("Safety warnings: None"));
        assert!(context.contains("clear of restricted areas"));
        assert!(context.contains("Clear, wind 12 km/h"));
    }
}
