//! AirGuard core: geospatial risk scoring, path rerouting and flight replay.
//!
//! Everything in this crate is synchronous and free of I/O. Inputs are
//! immutable snapshots (path, zone catalog, drone configuration, weather);
//! each call derives its result fresh, so callers need no locking.

pub mod geo;
pub mod models;
pub mod replay;
pub mod reroute;
pub mod risk;
pub mod zones;

pub use models::{
    Coordinate, DroneConfig, RiskResult, SimulationState, WeatherCondition, WeatherSnapshot,
    WeightClass, Zone, ZoneSeverity,
};
pub use replay::{Replay, ReplayTick};
pub use reroute::{reroute, RerouteConfig};
pub use risk::{score_path, ProximityMode, RiskRules};
pub use zones::{ZoneCatalog, ZoneError};
