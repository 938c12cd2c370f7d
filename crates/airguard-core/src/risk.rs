//! Path risk scoring against zones, drone configuration and weather.
//!
//! Scoring is a fold of rule functions over an explicit `(score, violations)`
//! tally, applied in a fixed order: altitude, range, zones, weather. Each
//! rule is pure and testable in isolation; there is no shared mutable state.

use crate::geo;
use crate::models::{Coordinate, DroneConfig, RiskResult, WeatherSnapshot, ZoneSeverity};
use crate::zones::ZoneCatalog;
use serde::{Deserialize, Serialize};

/// Which waypoints are measured when checking proximity to a critical zone
/// the path does not intersect.
///
/// `FirstPointOnly` preserves the historical launch-point heuristic, which
/// under-detects near-misses past the first waypoint. `WholePath` measures
/// the minimum over every waypoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityMode {
    #[default]
    FirstPointOnly,
    WholePath,
}

/// Thresholds and weights for the risk rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRules {
    /// Hard AGL ceiling in meters
    pub altitude_ceiling_m: f64,
    /// Soft-warning altitude floor in meters (no violation message)
    pub altitude_soft_limit_m: f64,
    /// Cap on the altitude contribution
    pub altitude_penalty_cap: f64,
    /// Visual-line-of-sight operating radius in km
    pub vlos_radius_km: f64,
    /// Path length beyond which a BVLOS warning is recorded, in km
    pub bvlos_warning_km: f64,
    /// Range penalty per km beyond the VLOS radius
    pub range_penalty_per_km: f64,
    /// Cap on the range contribution
    pub range_penalty_cap: f64,
    /// Radial clearance around critical zones in km
    pub proximity_radius_km: f64,
    /// Distance under which a proximity alert message is recorded, in km
    pub proximity_alert_km: f64,
    /// Weight of the proximity contribution at zero distance
    pub proximity_weight: f64,
    /// Minimum score once restricted airspace is crossed
    pub restricted_floor: f64,
    /// Wind speed above which the high-wind penalty applies, in km/h
    pub high_wind_kmh: f64,
    pub high_wind_penalty: f64,
    pub proximity_mode: ProximityMode,
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            altitude_ceiling_m: 120.0,
            altitude_soft_limit_m: 100.0,
            altitude_penalty_cap: 60.0,
            vlos_radius_km: 2.0,
            bvlos_warning_km: 4.0,
            range_penalty_per_km: 8.0,
            range_penalty_cap: 30.0,
            proximity_radius_km: 1.0,
            proximity_alert_km: 0.3,
            proximity_weight: 40.0,
            restricted_floor: 85.0,
            high_wind_kmh: 15.0,
            high_wind_penalty: 20.0,
            proximity_mode: ProximityMode::default(),
        }
    }
}

/// Running `(score, violations)` pair threaded through the rule fold.
#[derive(Debug, Default)]
struct RiskTally {
    score: f64,
    violations: Vec<String>,
}

impl RiskTally {
    fn add(mut self, points: f64) -> Self {
        self.score += points;
        self
    }

    /// Set the score to an exact value, discarding prior contributions.
    fn pin(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Raise the score to at least `floor`; never lowers it.
    fn raise_to(mut self, floor: f64) -> Self {
        self.score = self.score.max(floor);
        self
    }

    fn flag(mut self, message: String) -> Self {
        self.violations.push(message);
        self
    }
}

/// Score a flight path. Deterministic and side-effect free; safe to call on
/// every edit. Paths with fewer than 2 points have no geometry and score 0
/// with no violations, regardless of weather.
pub fn score_path(
    path: &[Coordinate],
    config: &DroneConfig,
    catalog: &ZoneCatalog,
    weather: Option<&WeatherSnapshot>,
    rules: &RiskRules,
) -> RiskResult {
    if path.len() < 2 {
        return RiskResult::empty();
    }

    let tally = RiskTally::default();
    let tally = altitude_rule(tally, config, rules);
    let tally = range_rule(tally, path, rules);
    let tally = zone_rule(tally, path, catalog, rules);
    let tally = weather_rule(tally, weather, rules);

    RiskResult {
        score: round2(tally.score.clamp(0.0, 100.0)),
        violations: tally.violations,
    }
}

fn altitude_rule(tally: RiskTally, config: &DroneConfig, rules: &RiskRules) -> RiskTally {
    let altitude = config.altitude_m;
    if altitude > rules.altitude_ceiling_m {
        let excess = altitude - rules.altitude_ceiling_m;
        let penalty = (40.0 + 0.15 * excess).min(rules.altitude_penalty_cap);
        tally.add(penalty).flag(format!(
            "ALTITUDE_VIOLATION: planned altitude {altitude:.0}m exceeds the {:.0}m AGL ceiling; \
             special clearance is required above it",
            rules.altitude_ceiling_m
        ))
    } else if altitude > rules.altitude_soft_limit_m {
        // Soft warning band: contributes to the score without a message.
        tally.add(0.5 * (altitude - rules.altitude_soft_limit_m))
    } else {
        tally
    }
}

fn range_rule(tally: RiskTally, path: &[Coordinate], rules: &RiskRules) -> RiskTally {
    let length_km = geo::path_length_m(path) / 1000.0;
    if length_km <= rules.vlos_radius_km {
        return tally;
    }

    let penalty = (rules.range_penalty_per_km * (length_km - rules.vlos_radius_km))
        .min(rules.range_penalty_cap);
    let tally = tally.add(penalty);
    if length_km > rules.bvlos_warning_km {
        tally.flag(format!(
            "BVLOS_WARNING: total path length {length_km:.2}km exceeds the {:.0}km visual \
             line of sight radius; a certified observer is required",
            rules.bvlos_warning_km
        ))
    } else {
        tally
    }
}

fn zone_rule(
    mut tally: RiskTally,
    path: &[Coordinate],
    catalog: &ZoneCatalog,
    rules: &RiskRules,
) -> RiskTally {
    for zone in catalog.zones() {
        if zone.severity == ZoneSeverity::Advisory {
            continue;
        }

        if geo::path_intersects_polygon(path, &zone.boundary) {
            tally = match zone.severity {
                ZoneSeverity::Critical => tally.pin(100.0).flag(format!(
                    "NFZ_BREACH: flight path enters no-fly zone {}; flight is prohibited \
                     without security clearance",
                    zone.name
                )),
                ZoneSeverity::Restricted => tally.raise_to(rules.restricted_floor).flag(format!(
                    "RESTRICTED_AIRSPACE: flight path crosses {}; an active permit and ATC \
                     coordination are required",
                    zone.name
                )),
                ZoneSeverity::Advisory => tally,
            };
        } else if zone.severity == ZoneSeverity::Critical {
            let distance_m = match rules.proximity_mode {
                ProximityMode::FirstPointOnly => {
                    geo::distance_to_polygon_boundary_m(path[0], &zone.boundary)
                }
                ProximityMode::WholePath => path
                    .iter()
                    .map(|point| geo::distance_to_polygon_boundary_m(*point, &zone.boundary))
                    .fold(f64::INFINITY, f64::min),
            };
            let distance_km = distance_m / 1000.0;
            if distance_km < rules.proximity_radius_km {
                tally = tally.add(
                    (1.0 - distance_km / rules.proximity_radius_km) * rules.proximity_weight,
                );
                if distance_km < rules.proximity_alert_km {
                    tally = tally.flag(format!(
                        "PROXIMITY_ALERT: trajectory within {distance_m:.0}m of {}; maintain \
                         {:.0}m radial clearance",
                        zone.name,
                        rules.proximity_radius_km * 1000.0
                    ));
                }
            }
        }
    }
    tally
}

fn weather_rule(
    tally: RiskTally,
    weather: Option<&WeatherSnapshot>,
    rules: &RiskRules,
) -> RiskTally {
    // Missing weather is treated as flyable with no contribution; scoring
    // stays available when the provider is down.
    let Some(weather) = weather else {
        return tally;
    };

    if !weather.flyable {
        tally.pin(100.0).flag(format!(
            "WEATHER_UNSAFE: conditions reported not flyable ({})",
            weather.condition
        ))
    } else if weather.wind_speed_kmh > rules.high_wind_kmh {
        tally.add(rules.high_wind_penalty).flag(format!(
            "WEATHER: high winds at {:.0}km/h",
            weather.wind_speed_kmh
        ))
    } else {
        tally
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
