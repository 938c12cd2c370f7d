//! Static airspace zone catalog.
//!
//! Zones are loaded once at startup and shared read-only by the scorer and
//! the rerouting engine. The catalog is an explicitly constructed value
//! passed by reference, so tests can substitute synthetic zone sets.

use crate::models::{Coordinate, Zone, ZoneSeverity};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("zone {id} is invalid: {}", .problems.join("; "))]
    Invalid { id: String, problems: Vec<String> },
    #[error("failed to parse zone list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable set of named polygonal zones.
#[derive(Debug, Clone, Default)]
pub struct ZoneCatalog {
    zones: Vec<Zone>,
}

impl ZoneCatalog {
    /// Build a catalog, validating every zone.
    pub fn new(zones: Vec<Zone>) -> Result<Self, ZoneError> {
        for zone in &zones {
            let problems = zone.validate();
            if !problems.is_empty() {
                return Err(ZoneError::Invalid {
                    id: zone.id.clone(),
                    problems,
                });
            }
        }
        Ok(Self { zones })
    }

    /// Load a catalog from a JSON array of zone records.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ZoneError> {
        let zones: Vec<Zone> = serde_json::from_slice(bytes)?;
        Self::new(zones)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones that participate in intersection risk (everything except
    /// advisory, display-only zones).
    pub fn non_advisory(&self) -> impl Iterator<Item = &Zone> {
        self.zones
            .iter()
            .filter(|zone| zone.severity != ZoneSeverity::Advisory)
    }

    /// Built-in operational dataset for the Bengaluru pilot region.
    pub fn bengaluru() -> Self {
        let coord = Coordinate::new;
        Self {
            zones: vec![
                Zone {
                    id: "z1".to_string(),
                    name: "Kempegowda Int. Airport (KIA) - Primary Airspace".to_string(),
                    severity: ZoneSeverity::Critical,
                    boundary: vec![
                        coord(13.2150, 77.6800),
                        coord(13.2200, 77.7300),
                        coord(13.2000, 77.7450),
                        coord(13.1800, 77.7400),
                        coord(13.1750, 77.6950),
                        coord(13.1850, 77.6750),
                    ],
                },
                Zone {
                    id: "z2".to_string(),
                    name: "Yelahanka Air Force Station - Training Grounds".to_string(),
                    severity: ZoneSeverity::Restricted,
                    boundary: vec![
                        coord(13.1550, 77.5950),
                        coord(13.1500, 77.6250),
                        coord(13.1300, 77.6350),
                        coord(13.1150, 77.6200),
                        coord(13.1200, 77.5850),
                        coord(13.1400, 77.5800),
                    ],
                },
                Zone {
                    id: "z3".to_string(),
                    name: "Bangalore Central - High Security Corridor".to_string(),
                    severity: ZoneSeverity::Advisory,
                    boundary: vec![
                        coord(13.0100, 77.5600),
                        coord(13.0150, 77.6150),
                        coord(12.9850, 77.6400),
                        coord(12.9450, 77.6250),
                        coord(12.9400, 77.5750),
                        coord(12.9700, 77.5500),
                    ],
                },
                Zone {
                    id: "z4".to_string(),
                    name: "HAL Airspace Corridor - Industrial Sector".to_string(),
                    severity: ZoneSeverity::Critical,
                    boundary: vec![
                        coord(12.9650, 77.6450),
                        coord(12.9550, 77.6850),
                        coord(12.9400, 77.6950),
                        coord(12.9350, 77.6550),
                        coord(12.9500, 77.6350),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_boundary() {
        let result = ZoneCatalog::new(vec![Zone {
            id: "bad".to_string(),
            name: "Bad".to_string(),
            severity: ZoneSeverity::Critical,
            boundary: vec![Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0)],
        }]);
        match result {
            Err(ZoneError::Invalid { id, .. }) => assert_eq!(id, "bad"),
            other => panic!("expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = ZoneCatalog::bengaluru();
        assert_eq!(catalog.zones().len(), 4);
        assert!(catalog.zones().iter().all(Zone::is_valid));
        // The advisory corridor is display-only.
        assert_eq!(catalog.non_advisory().count(), 3);
    }

    #[test]
    fn loads_from_json_records() {
        let raw = r#"[
            {
                "id": "j1",
                "name": "Test Field",
                "severity": "restricted",
                "boundary": [
                    {"lat": 0.0, "lng": 0.0},
                    {"lat": 0.0, "lng": 1.0},
                    {"lat": 1.0, "lng": 0.5}
                ]
            }
        ]"#;
        let catalog = ZoneCatalog::from_json(raw.as_bytes()).unwrap();
        assert_eq!(catalog.zones().len(), 1);
        assert_eq!(catalog.zones()[0].severity, ZoneSeverity::Restricted);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = ZoneCatalog::from_json(b"{not json");
        assert!(matches!(result, Err(ZoneError::Parse(_))));
    }
}
