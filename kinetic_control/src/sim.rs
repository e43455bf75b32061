//! Closed-loop simulation against a second-order plant.
//!
//! The plant integrates
//!
//! ```text
//! a = power / inertia − damping × v
//! v += a × dt
//! x += v × dt
//! ```
//!
//! with semi-implicit Euler, and the loop runs on a [`ManualClock`] advanced
//! by exactly one period per tick, so a run is fully deterministic.

use std::time::Duration;

use kinetic_common::config::{ConfigError, SharedConfig};
use kinetic_common::prelude::NANOS_PER_SECOND;
use kinetic_common::state::KineticState;
use kinetic_common::time::ManualClock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ControlSystemConfig;
use crate::system::ControlSystem;

/// Physical parameters of the simulated mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Power needed per unit of acceleration.
    pub inertia: f64,
    /// Viscous damping, per second.
    pub damping: f64,
    /// State at the start of the run.
    pub initial: KineticState,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            inertia: 1.0,
            damping: 0.0,
            initial: KineticState::ZERO,
        }
    }
}

/// Loop rate, run length and step target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Control loop frequency.
    pub rate_hz: f64,
    /// Simulated time.
    pub duration_s: f64,
    /// Goal position.
    pub goal: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            rate_hz: 100.0,
            duration_s: 10.0,
            goal: 1.0,
        }
    }
}

impl RunConfig {
    /// Loop period rounded to whole nanoseconds.
    pub fn period(&self) -> Duration {
        Duration::from_nanos((NANOS_PER_SECOND / self.rate_hz).round() as u64)
    }

    /// Number of ticks in the run.
    pub fn ticks(&self) -> u64 {
        (self.duration_s * self.rate_hz).round() as u64
    }
}

/// Longest run the simulator accepts.
pub const MAX_TICKS: u64 = 100_000_000;

fn default_tolerance() -> KineticState {
    KineticState::new(0.01, 0.05, 0.5)
}

/// Simulation file: `[shared]`, `[plant]`, `[run]`, `[control]`, `[tolerance]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub plant: PlantConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub control: ControlSystemConfig,
    /// Allowed final deviation from the goal, per channel.
    #[serde(default = "default_tolerance")]
    pub tolerance: KineticState,
}

impl SimulationConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// `ConfigError::ValidationError` naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::ValidationError(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        };
        positive("plant.inertia", self.plant.inertia)?;
        positive("run.rate_hz", self.run.rate_hz)?;
        positive("run.duration_s", self.run.duration_s)?;

        if self.run.period().is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "run.rate_hz {} gives a loop period under one nanosecond",
                self.run.rate_hz
            )));
        }
        let ticks = self.run.duration_s * self.run.rate_hz;
        if !ticks.is_finite() || ticks > MAX_TICKS as f64 {
            return Err(ConfigError::ValidationError(format!(
                "run.duration_s × run.rate_hz = {ticks} ticks, limit is {MAX_TICKS}"
            )));
        }

        if self.plant.damping.is_nan() || self.plant.damping < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "plant.damping must be non-negative, got {}",
                self.plant.damping
            )));
        }
        if !self.run.goal.is_finite() {
            return Err(ConfigError::ValidationError(
                "run.goal must be finite".to_string(),
            ));
        }
        let t = self.tolerance;
        if ![t.position, t.velocity, t.acceleration]
            .iter()
            .all(|channel| *channel >= 0.0)
        {
            return Err(ConfigError::ValidationError(
                "tolerance channels must be non-negative".to_string(),
            ));
        }

        self.control.validate()
    }
}

/// Second-order plant driven by the controller output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedPlant {
    state: KineticState,
    inertia: f64,
    damping: f64,
}

impl SimulatedPlant {
    pub fn new(config: &PlantConfig) -> Self {
        Self {
            state: config.initial,
            inertia: config.inertia,
            damping: config.damping,
        }
    }

    /// Current position, velocity and acceleration.
    pub const fn state(&self) -> KineticState {
        self.state
    }

    /// Apply `power` for `dt` seconds.
    #[inline]
    pub fn step(&mut self, power: f64, dt: f64) {
        let acceleration = power / self.inertia - self.damping * self.state.velocity;
        let velocity = self.state.velocity + acceleration * dt;
        let position = self.state.position + velocity * dt;
        self.state = KineticState::new(position, velocity, acceleration);
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationReport {
    /// Ticks executed.
    pub ticks: u64,
    /// Plant state after the last tick.
    pub final_state: KineticState,
    /// Controller output on the last tick.
    pub final_output: f64,
    /// Largest output magnitude seen.
    pub peak_output: f64,
    /// Largest position excursion past the goal.
    pub overshoot: f64,
    /// Simulated time after which the loop stayed in tolerance.
    pub settle_time_s: Option<f64>,
    /// Whether the last tick ended in tolerance.
    pub within_tolerance: bool,
}

/// A control system, a plant and the clock they share.
pub struct Simulation {
    system: ControlSystem,
    plant: SimulatedPlant,
    clock: ManualClock,
    run: RunConfig,
    tolerance: KineticState,
}

impl Simulation {
    /// Build everything a [`SimulationConfig`] describes.
    ///
    /// # Errors
    ///
    /// Any validation error from the configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let clock = ManualClock::new();
        let system = config.control.build(clock.clone())?;
        Ok(Self::new(
            system,
            SimulatedPlant::new(&config.plant),
            clock,
            config.run,
            config.tolerance,
        ))
    }

    /// Run `system` against `plant`. `clock` must be the one the system's
    /// time-dependent elements read.
    pub fn new(
        system: ControlSystem,
        plant: SimulatedPlant,
        clock: ManualClock,
        run: RunConfig,
        tolerance: KineticState,
    ) -> Self {
        Self {
            system,
            plant,
            clock,
            run,
            tolerance,
        }
    }

    pub const fn system(&self) -> &ControlSystem {
        &self.system
    }

    pub const fn plant(&self) -> &SimulatedPlant {
        &self.plant
    }

    /// Step to the goal and report how the loop behaved.
    pub fn run(&mut self) -> SimulationReport {
        let period = self.run.period();
        let dt = period.as_nanos() as f64 / NANOS_PER_SECOND;
        let ticks = self.run.ticks();
        let goal = self.run.goal;

        info!(
            rate_hz = self.run.rate_hz,
            duration_s = self.run.duration_s,
            goal,
            "starting simulation"
        );
        self.system.set_goal(KineticState::from_position(goal));

        let direction = goal - self.plant.state().position;
        let mut final_output = 0.0;
        let mut peak_output = 0.0_f64;
        let mut overshoot = 0.0_f64;
        let mut settled_at = None;

        for tick in 0..ticks {
            let output = self.system.calculate(self.plant.state());
            self.plant.step(output, dt);
            self.clock.advance(period);

            final_output = output;
            peak_output = peak_output.max(output.abs());

            let past_goal = (self.plant.state().position - goal) * direction.signum();
            overshoot = overshoot.max(past_goal);

            if !self.system.is_within_tolerance(self.tolerance) {
                settled_at = None;
            } else if settled_at.is_none() {
                settled_at = Some(tick);
            }
        }

        let report = SimulationReport {
            ticks,
            final_state: self.plant.state(),
            final_output,
            peak_output,
            overshoot,
            settle_time_s: settled_at.map(|tick| tick as f64 * dt),
            within_tolerance: ticks > 0 && self.system.is_within_tolerance(self.tolerance),
        };
        debug!(?report, "simulation finished");
        report
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
