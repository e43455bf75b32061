//! # Kinetic Simulator
//!
//! Runs a closed-loop step response of a configured control system against
//! a simulated second-order plant, on a deterministic clock.
//!
//! Exit status is 0 when the run ends within tolerance of the goal, 1 on a
//! configuration error, and 2 when the loop failed to settle.

use clap::Parser;
use kinetic_common::config::{ConfigLoader, LogLevel};
use kinetic_control::sim::{Simulation, SimulationConfig};
use std::path::PathBuf;
use std::process;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Kinetic Simulator: step response of a control loop
#[derive(Parser, Debug)]
#[command(name = "kinetic_sim")]
#[command(version)]
#[command(about = "Closed-loop step response against a simulated plant")]
struct Args {
    /// Simulation TOML file.
    #[arg(long, value_name = "FILE", default_value = "config/sim.toml")]
    config: PathBuf,

    /// Override the control loop rate.
    #[arg(long)]
    rate_hz: Option<f64>,

    /// Override the simulated duration.
    #[arg(long)]
    duration_s: Option<f64>,

    /// Override the goal position.
    #[arg(long, allow_negative_numbers = true)]
    goal: Option<f64>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = SimulationConfig::load(&args.config);
    let log_level = config
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, log_level);

    info!("Kinetic Simulator v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = config
        .map_err(Into::into)
        .and_then(|config| run(&args, config));
    match result {
        Ok(true) => info!("goal reached within tolerance"),
        Ok(false) => {
            warn!("loop did not settle within tolerance");
            process::exit(2);
        }
        Err(e) => {
            error!("FATAL: {e}");
            process::exit(1);
        }
    }
}

fn run(args: &Args, mut config: SimulationConfig) -> Result<bool, Box<dyn std::error::Error>> {
    if let Some(rate_hz) = args.rate_hz {
        config.run.rate_hz = rate_hz;
    }
    if let Some(duration_s) = args.duration_s {
        config.run.duration_s = duration_s;
    }
    if let Some(goal) = args.goal {
        config.run.goal = goal;
    }

    info!(
        "Config OK: service={}, rate={} Hz, duration={} s",
        config.shared.service_name, config.run.rate_hz, config.run.duration_s,
    );

    let mut simulation = Simulation::from_config(&config)?;
    let report = simulation.run();

    info!(
        ticks = report.ticks,
        position = report.final_state.position,
        velocity = report.final_state.velocity,
        peak_output = report.peak_output,
        overshoot = report.overshoot,
        settle_time_s = ?report.settle_time_s,
        "simulation complete"
    );

    Ok(report.within_tolerance)
}

fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        configured.into()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
