//! Gravity-compensating feedforward for elevators and arms.
//!
//! Both models add a gravity term to the basic motor model. An elevator
//! carries a constant load (`kG`); an arm's load torque varies with the cosine
//! of its angle from horizontal, with position in radians.

use kinetic_common::state::KineticState;
use serde::{Deserialize, Serialize};

use super::{FeedforwardElement, motor_terms};

/// Gains of a gravity-loaded mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityFeedforwardParameters {
    /// Gravity gain.
    pub kg: f64,
    /// Velocity gain.
    pub kv: f64,
    /// Acceleration gain.
    pub ka: f64,
    /// Static friction.
    pub ks: f64,
}

impl GravityFeedforwardParameters {
    pub const fn new(kg: f64, kv: f64, ka: f64, ks: f64) -> Self {
        Self { kg, kv, ka, ks }
    }

    #[inline]
    fn motor(&self, reference: KineticState) -> f64 {
        motor_terms(self.kv, self.ka, self.ks, reference)
    }
}

/// `kG + kV × v + kA × a + kS × sign(v)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElevatorFeedforward {
    parameters: GravityFeedforwardParameters,
}

impl ElevatorFeedforward {
    pub const fn new(parameters: GravityFeedforwardParameters) -> Self {
        Self { parameters }
    }

    pub const fn parameters(&self) -> GravityFeedforwardParameters {
        self.parameters
    }

    /// Hot-swap the gains.
    pub const fn set_parameters(&mut self, parameters: GravityFeedforwardParameters) {
        self.parameters = parameters;
    }
}

impl FeedforwardElement for ElevatorFeedforward {
    #[inline]
    fn calculate(&self, reference: KineticState) -> f64 {
        self.parameters.kg + self.parameters.motor(reference)
    }
}

/// `kG × cos(position) + kV × v + kA × a + kS × sign(v)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArmFeedforward {
    parameters: GravityFeedforwardParameters,
}

impl ArmFeedforward {
    pub const fn new(parameters: GravityFeedforwardParameters) -> Self {
        Self { parameters }
    }

    pub const fn parameters(&self) -> GravityFeedforwardParameters {
        self.parameters
    }

    /// Hot-swap the gains.
    pub const fn set_parameters(&mut self, parameters: GravityFeedforwardParameters) {
        self.parameters = parameters;
    }
}

impl FeedforwardElement for ArmFeedforward {
    #[inline]
    fn calculate(&self, reference: KineticState) -> f64 {
        self.parameters.kg * reference.position.cos() + self.parameters.motor(reference)
    }
}
