//! Time-driven flight replay along a planned path.
//!
//! The replay is an explicit state machine advanced by an external clock:
//! each tick receives total elapsed seconds and produces a fresh
//! `SimulationState`. Ticks hold no cross-tick accumulation beyond the last
//! heading, so they can be skipped or coalesced under slow frames without
//! corrupting the simulation.

use crate::geo;
use crate::models::{Coordinate, DroneConfig, SimulationState};

/// Look-ahead used when deriving heading, avoiding zero-length bearing
/// vectors near the current position.
pub const LOOK_AHEAD_M: f64 = 2.0;

/// Battery percentage consumed over a full path traversal.
const BATTERY_DRAIN_PCT: f64 = 15.0;

/// Outcome of one replay tick.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayTick {
    /// Simulation advanced; the drone is still en route.
    Advanced(SimulationState),
    /// The path end was reached (or the path is invalid); the caller should
    /// stop ticking. Carries the terminal state.
    Completed(SimulationState),
}

/// Replay of one path snapshot at a fixed speed profile.
#[derive(Debug, Clone)]
pub struct Replay {
    path: Vec<Coordinate>,
    total_length_m: f64,
    base_speed_mps: f64,
    speed_multiplier: f64,
    last_heading_deg: f64,
}

impl Replay {
    /// Arm a replay over a snapshot of the path. The base speed comes from
    /// the drone's weight class.
    pub fn new(path: Vec<Coordinate>, config: &DroneConfig, speed_multiplier: f64) -> Self {
        let total_length_m = geo::path_length_m(&path);
        Self {
            path,
            total_length_m,
            base_speed_mps: config.weight_class.base_speed_mps(),
            speed_multiplier,
            last_heading_deg: 0.0,
        }
    }

    /// Effective ground speed.
    pub fn speed_mps(&self) -> f64 {
        self.base_speed_mps * self.speed_multiplier
    }

    pub fn total_length_m(&self) -> f64 {
        self.total_length_m
    }

    /// Advance to the position reached after `elapsed_s` seconds of flight.
    ///
    /// Never panics: an invalid path (fewer than 2 points, or zero length)
    /// completes immediately instead of failing.
    pub fn tick(&mut self, elapsed_s: f64) -> ReplayTick {
        if self.path.len() < 2 || self.total_length_m <= 0.0 {
            let position = self
                .path
                .first()
                .copied()
                .unwrap_or(Coordinate { lat: 0.0, lng: 0.0 });
            return ReplayTick::Completed(SimulationState {
                progress: 1.0,
                position,
                heading_deg: self.last_heading_deg,
                speed_mps: 0.0,
                battery_percent: 100.0,
            });
        }

        let distance_m = elapsed_s.max(0.0) * self.speed_mps();
        let progress = (distance_m / self.total_length_m).min(1.0);
        let position =
            geo::point_at_distance_along(&self.path, distance_m).unwrap_or(self.path[0]);

        let heading_deg = if distance_m + LOOK_AHEAD_M >= self.total_length_m {
            // At (or within look-ahead of) the path end: keep the last
            // heading instead of deriving one from a degenerate vector.
            self.last_heading_deg
        } else {
            let ahead = geo::point_at_distance_along(&self.path, distance_m + LOOK_AHEAD_M)
                .unwrap_or(position);
            let heading = geo::bearing_deg(position, ahead);
            self.last_heading_deg = heading;
            heading
        };

        let state = SimulationState {
            progress,
            position,
            heading_deg,
            speed_mps: self.speed_mps(),
            battery_percent: 100.0 - BATTERY_DRAIN_PCT * progress,
        };

        if progress >= 1.0 {
            ReplayTick::Completed(state)
        } else {
            ReplayTick::Advanced(state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeightClass;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng)
    }

    fn light_drone() -> DroneConfig {
        DroneConfig {
            altitude_m: 60.0,
            weight_class: WeightClass::Light,
        }
    }

    fn heavy_drone() -> DroneConfig {
        DroneConfig {
            altitude_m: 60.0,
            weight_class: WeightClass::Heavy,
        }
    }

    /// ~2.2km straight path north along the prime meridian.
    fn test_path() -> Vec<Coordinate> {
        vec![coord(0.0, 0.0), coord(0.02, 0.0)]
    }

    #[test]
    fn tick_at_zero_starts_at_first_waypoint() {
        let mut replay = Replay::new(test_path(), &light_drone(), 1.0);
        match replay.tick(0.0) {
            ReplayTick::Advanced(state) => {
                assert_eq!(state.position, test_path()[0]);
                assert_eq!(state.progress, 0.0);
                assert!((state.battery_percent - 100.0).abs() < 1e-9);
                assert!((state.speed_mps - 5.0).abs() < 1e-9);
            }
            other => panic!("expected Advanced, got {other:?}"),
        }
    }

    #[test]
    fn long_elapsed_time_completes_with_terminal_state() {
        let mut replay = Replay::new(test_path(), &light_drone(), 1.0);
        match replay.tick(1e6) {
            ReplayTick::Completed(state) => {
                assert_eq!(state.progress, 1.0);
                assert!((state.battery_percent - 85.0).abs() < 1e-9);
                let end = *test_path().last().unwrap();
                assert!(geo::haversine_distance_m(state.position, end) < 1.0);
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn invalid_path_completes_immediately() {
        let mut replay = Replay::new(vec![coord(1.0, 1.0)], &light_drone(), 1.0);
        assert!(matches!(replay.tick(0.0), ReplayTick::Completed(_)));

        let mut empty = Replay::new(Vec::new(), &light_drone(), 1.0);
        assert!(matches!(empty.tick(5.0), ReplayTick::Completed(_)));
    }

    #[test]
    fn heading_follows_the_path_and_persists_at_the_end() {
        let mut replay = Replay::new(test_path(), &light_drone(), 1.0);
        let mid_heading = match replay.tick(10.0) {
            ReplayTick::Advanced(state) => state.heading_deg,
            other => panic!("expected Advanced, got {other:?}"),
        };
        // Northbound leg.
        assert!(mid_heading < 1.0 || mid_heading > 359.0);

        match replay.tick(1e6) {
            ReplayTick::Completed(state) => assert_eq!(state.heading_deg, mid_heading),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn speed_multiplier_scales_weight_class_speed() {
        let replay = Replay::new(test_path(), &heavy_drone(), 2.0);
        assert!((replay.speed_mps() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn battery_depletes_linearly_with_progress() {
        let mut replay = Replay::new(test_path(), &light_drone(), 1.0);
        let total = replay.total_length_m();
        // Half the path at 5 m/s.
        let half_time = total / 2.0 / 5.0;
        match replay.tick(half_time) {
            ReplayTick::Advanced(state) => {
                assert!((state.progress - 0.5).abs() < 1e-6);
                assert!((state.battery_percent - 92.5).abs() < 1e-3);
            }
            other => panic!("expected Advanced, got {other:?}"),
        }
    }
}
