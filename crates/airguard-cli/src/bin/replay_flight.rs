//! Replay a mission's flight path as printed telemetry.
//!
//! Drives the kinematic replay off a wall-clock interval; the replay itself
//! only ever sees elapsed seconds.

use airguard_cli::mission::Mission;
use airguard_core::replay::{Replay, ReplayTick};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulate flying a mission and print position, heading and battery.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Mission file (JSON: name, path, drone)
    mission: PathBuf,

    /// Tick rate in Hz
    #[arg(long, default_value_t = 1.0)]
    rate: f64,

    /// Speed multiplier applied to the weight-class base speed
    #[arg(long, default_value_t = 1.0)]
    speed_multiplier: f64,

    /// Abort after this many wall-clock seconds
    #[arg(long)]
    max_seconds: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mission = Mission::load(&args.mission)?;

    let mut replay = Replay::new(mission.path.clone(), &mission.drone, args.speed_multiplier);

    println!(
        "Replaying {} waypoints, {:.2} km at {:.1} m/s",
        mission.path.len(),
        replay.total_length_m() / 1000.0,
        replay.speed_mps()
    );

    let start = time::Instant::now();
    let mut interval = time::interval(Duration::from_secs_f64(1.0 / args.rate.max(0.1)));
    let mut tick_count = 0u32;

    loop {
        interval.tick().await;

        let elapsed = start.elapsed().as_secs_f64();
        if let Some(max) = args.max_seconds {
            if elapsed > max {
                println!("\nReplay aborted after {:.0}s.", elapsed);
                break;
            }
        }

        match replay.tick(elapsed) {
            ReplayTick::Advanced(state) => {
                tick_count += 1;
                println!(
                    "[{:4}] pos ({:.6}, {:.6}) hdg {:6.1} spd {:.1} m/s bat {:5.1}% prog {:3.0}%",
                    tick_count,
                    state.position.lat,
                    state.position.lng,
                    state.heading_deg,
                    state.speed_mps,
                    state.battery_percent,
                    state.progress * 100.0
                );
            }
            ReplayTick::Completed(state) => {
                println!(
                    "\nReplay complete after {} ticks; battery at {:.1}%.",
                    tick_count, state.battery_percent
                );
                break;
            }
        }
    }

    Ok(())
}
