//! Core data models for flight planning and risk assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Severity class of an airspace zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneSeverity {
    /// No flight permitted under any circumstances
    Critical,
    /// Flight requires prior authorization
    Restricted,
    /// Display-only; never contributes to intersection risk
    Advisory,
}

/// A named polygonal airspace zone.
///
/// The boundary is an open simple polygon (first vertex is NOT repeated at
/// the end); the geometry layer closes the ring when iterating edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub severity: ZoneSeverity,
    pub boundary: Vec<Coordinate>,
}

impl Zone {
    /// Validate zone configuration.
    /// Returns list of validation errors (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.id.trim().is_empty() {
            errors.push("Zone id must not be empty".to_string());
        }

        if self.boundary.len() < 3 {
            errors.push("Boundary must have at least 3 vertices".to_string());
        }

        for vertex in &self.boundary {
            if !vertex.lat.is_finite() || !vertex.lng.is_finite() {
                errors.push("Boundary vertices must be finite".to_string());
                break;
            }
            if vertex.lat.abs() > 90.0 || vertex.lng.abs() > 180.0 {
                errors.push(format!(
                    "Boundary vertex ({}, {}) outside WGS84 range",
                    vertex.lat, vertex.lng
                ));
                break;
            }
        }

        errors
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Drone weight class with its kinematic parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightClass {
    /// Sub-250g class
    #[default]
    Light,
    /// Above 2kg
    Heavy,
}

impl WeightClass {
    /// Cruise speed used by the replay engine.
    pub fn base_speed_mps(self) -> f64 {
        match self {
            WeightClass::Light => 5.0,
            WeightClass::Heavy => 12.0,
        }
    }
}

impl fmt::Display for WeightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightClass::Light => write!(f, "light"),
            WeightClass::Heavy => write!(f, "heavy"),
        }
    }
}

/// Operator-controlled drone configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DroneConfig {
    pub altitude_m: f64,
    pub weight_class: WeightClass,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            altitude_m: 60.0,
            weight_class: WeightClass::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Storm,
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherCondition::Clear => write!(f, "Clear"),
            WeatherCondition::Cloudy => write!(f, "Cloudy"),
            WeatherCondition::Rain => write!(f, "Rain"),
            WeatherCondition::Storm => write!(f, "Storm"),
        }
    }
}

/// A point-in-time weather observation supplied by an external provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub wind_speed_kmh: f64,
    pub visibility_km: f64,
    pub condition: WeatherCondition,
    pub flyable: bool,
    pub observed_at: DateTime<Utc>,
}

/// Result of scoring a flight path.
///
/// Always derived fresh from path + config + zones + weather; never updated
/// incrementally. Violations keep discovery order and are never deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    /// Aggregate risk in [0, 100], rounded to two decimals
    pub score: f64,
    pub violations: Vec<String>,
}

impl RiskResult {
    pub fn empty() -> Self {
        Self {
            score: 0.0,
            violations: Vec::new(),
        }
    }
}

/// Snapshot of a simulated flight at one replay tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Fraction of the path covered, in [0, 1]
    pub progress: f64,
    pub position: Coordinate,
    /// Heading in degrees, [0, 360)
    pub heading_deg: f64,
    pub speed_mps: f64,
    pub battery_percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_with_two_vertices_is_invalid() {
        let zone = Zone {
            id: "z1".to_string(),
            name: "Degenerate".to_string(),
            severity: ZoneSeverity::Critical,
            boundary: vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
        };
        assert!(!zone.is_valid());
        assert!(zone.validate()[0].contains("at least 3"));
    }

    #[test]
    fn zone_outside_wgs84_range_is_invalid() {
        let zone = Zone {
            id: "z1".to_string(),
            name: "Bad".to_string(),
            severity: ZoneSeverity::Advisory,
            boundary: vec![
                Coordinate::new(91.0, 0.0),
                Coordinate::new(0.0, 1.0),
                Coordinate::new(1.0, 0.0),
            ],
        };
        assert!(!zone.is_valid());
    }

    #[test]
    fn weight_class_speeds() {
        assert!((WeightClass::Light.base_speed_mps() - 5.0).abs() < f64::EPSILON);
        assert!((WeightClass::Heavy.base_speed_mps() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn coordinate_roundtrips_through_json() {
        let point = Coordinate::new(13.1986, 77.7066);
        let json = serde_json::to_string(&point).unwrap();
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(point, back);
    }
}
