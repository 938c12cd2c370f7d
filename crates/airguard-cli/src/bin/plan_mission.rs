//! Score a mission file against the zone catalog, optionally rerouting it
//! and requesting an advisory briefing.

use airguard_cli::{advisory, mission::Mission, weather};
use airguard_core::{
    geo, reroute, risk,
    risk::{ProximityMode, RiskRules},
    zones::ZoneCatalog,
};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate a planned flight path against no-fly zones, drone limits and
/// current weather.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Mission file (JSON: name, path, drone)
    mission: PathBuf,

    /// Zone catalog JSON; defaults to the built-in Bengaluru catalog
    #[arg(long)]
    zones: Option<PathBuf>,

    /// Fetch live weather for the first waypoint
    #[arg(long)]
    live_weather: bool,

    /// Weather provider URL
    #[arg(long, default_value = weather::DEFAULT_WEATHER_URL)]
    weather_url: String,

    /// Apply the corrective reroute pass before scoring
    #[arg(long)]
    reroute: bool,

    /// Write the (possibly rerouted) mission to this file
    #[arg(long)]
    out: Option<PathBuf>,

    /// Request an advisory briefing for the plan
    #[arg(long)]
    advisory: bool,

    /// Advisory endpoint URL
    #[arg(long, default_value = "http://localhost:8080/v1/critique")]
    advisory_url: String,

    /// Check critical-zone proximity along the whole path instead of only
    /// the launch point
    #[arg(long)]
    whole_path_proximity: bool,

    /// Scenario preset overriding weather and altitude
    #[arg(long, value_enum)]
    scenario: Option<Scenario>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    Standard,
    HeavyWeather,
    HighAltitude,
}

impl Scenario {
    fn altitude_m(self) -> f64 {
        match self {
            Scenario::Standard => 60.0,
            Scenario::HeavyWeather => 40.0,
            Scenario::HighAltitude => 150.0,
        }
    }

    fn weather(self) -> airguard_core::models::WeatherSnapshot {
        use airguard_core::models::{WeatherCondition, WeatherSnapshot};
        use chrono::Utc;
        let (wind, visibility, condition) = match self {
            Scenario::Standard => (5.0, 10.0, WeatherCondition::Clear),
            Scenario::HeavyWeather => (35.0, 2.0, WeatherCondition::Storm),
            Scenario::HighAltitude => (10.0, 12.0, WeatherCondition::Clear),
        };
        WeatherSnapshot {
            wind_speed_kmh: wind,
            visibility_km: visibility,
            condition,
            flyable: weather::is_flyable(condition, wind, visibility),
            observed_at: Utc::now(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut mission = Mission::load(&args.mission)?;

    let catalog = match &args.zones {
        Some(file) => {
            let raw = std::fs::read(file)?;
            ZoneCatalog::from_json(&raw)?
        }
        None => ZoneCatalog::bengaluru(),
    };

    if let Some(scenario) = args.scenario {
        mission.drone.altitude_m = scenario.altitude_m();
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()?;

    let weather = if let Some(scenario) = args.scenario {
        Some(scenario.weather())
    } else if args.live_weather {
        let anchor = mission.path.first().copied();
        match anchor {
            Some(point) => {
                match weather::fetch_current(&client, &args.weather_url, point.lat, point.lng)
                    .await
                {
                    Ok(snapshot) => Some(snapshot),
                    Err(err) => {
                        tracing::warn!("weather fetch failed, scoring without it: {err}");
                        None
                    }
                }
            }
            None => None,
        }
    } else {
        None
    };

    if args.reroute {
        let before = mission.path.len();
        mission.path = reroute::reroute(
            &mission.path,
            &catalog,
            &reroute::RerouteConfig::default(),
        );
        tracing::info!(
            "reroute pass: {} -> {} waypoints",
            before,
            mission.path.len()
        );
    }

    let rules = RiskRules {
        proximity_mode: if args.whole_path_proximity {
            ProximityMode::WholePath
        } else {
            ProximityMode::FirstPointOnly
        },
        ..RiskRules::default()
    };
    let result = risk::score_path(
        &mission.path,
        &mission.drone,
        &catalog,
        weather.as_ref(),
        &rules,
    );

    let name = if mission.name.is_empty() {
        "unnamed mission"
    } else {
        mission.name.as_str()
    };
    println!(
        "Mission: {} ({} waypoints, {:.2} km)",
        name,
        mission.path.len(),
        geo::path_length_m(&mission.path) / 1000.0
    );
    if let Some(w) = &weather {
        println!(
            "Weather: {} | wind {:.0} km/h | visibility {:.0} km | flyable: {}",
            w.condition, w.wind_speed_kmh, w.visibility_km, w.flyable
        );
    }
    println!("Risk score: {:.2}", result.score);
    if result.violations.is_empty() {
        println!("No violations.");
    } else {
        for violation in &result.violations {
            println!("  - {violation}");
        }
    }

    if args.advisory {
        let context = advisory::briefing_context(
            &result,
            &mission.drone,
            weather.as_ref(),
            &mission.path,
            &catalog,
        );
        let api_key = std::env::var("AIRGUARD_ADVISORY_KEY").ok();
        let critique =
            advisory::request_critique(&client, &args.advisory_url, api_key.as_deref(), &context)
                .await;
        println!("\nAdvisory:\n{critique}");
    }

    if let Some(out) = &args.out {
        mission.save(out)?;
        println!("Saved mission to {}", out.display());
    }

    Ok(())
}
