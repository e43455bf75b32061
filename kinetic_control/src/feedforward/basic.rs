//! Basic motor feedforward: velocity, acceleration and static friction.

use kinetic_common::state::KineticState;
use serde::{Deserialize, Serialize};

use super::{FeedforwardElement, motor_terms};

/// Gains of the basic motor model.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicFeedforwardParameters {
    /// Velocity gain.
    pub kv: f64,
    /// Acceleration gain.
    pub ka: f64,
    /// Static friction.
    pub ks: f64,
}

impl BasicFeedforwardParameters {
    pub const fn new(kv: f64, ka: f64, ks: f64) -> Self {
        Self { kv, ka, ks }
    }
}

/// `kV × v + kA × a + kS × sign(v)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BasicFeedforward {
    parameters: BasicFeedforwardParameters,
}

impl BasicFeedforward {
    pub const fn new(parameters: BasicFeedforwardParameters) -> Self {
        Self { parameters }
    }

    pub const fn parameters(&self) -> BasicFeedforwardParameters {
        self.parameters
    }

    /// Hot-swap the gains.
    pub const fn set_parameters(&mut self, parameters: BasicFeedforwardParameters) {
        self.parameters = parameters;
    }
}

impl FeedforwardElement for BasicFeedforward {
    #[inline]
    fn calculate(&self, reference: KineticState) -> f64 {
        let BasicFeedforwardParameters { kv, ka, ks } = self.parameters;
        motor_terms(kv, ka, ks, reference)
    }
}
