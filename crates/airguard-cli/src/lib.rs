//! AirGuard CLI - operator tools for the flight planning engine.
//!
//! This crate provides the operator binaries:
//! - plan_mission: score a mission against the zone catalog, optionally
//!   rerouting it and requesting an advisory briefing
//! - replay_flight: drive the kinematic replay as printed telemetry

pub mod advisory;
pub mod mission;
pub mod weather;
