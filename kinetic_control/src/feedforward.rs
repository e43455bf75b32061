//! Feedforward (model-driven) elements.
//!
//! A [`FeedforwardElement`] predicts the power needed to follow a reference
//! from a physical model, independent of the measured error. Evaluation is
//! stateless: it only reads the reference and the element's parameters.
//!
//! ```text
//! basic    = kV × v + kA × a + kS × sign(v)
//! elevator = kG + basic
//! arm      = kG × cos(position) + basic
//! ```

pub mod basic;
pub mod gravity;

pub use basic::{BasicFeedforward, BasicFeedforwardParameters};
pub use gravity::{ArmFeedforward, ElevatorFeedforward, GravityFeedforwardParameters};

use kinetic_common::state::KineticState;

use crate::feedback::sign;

/// Computes an open-loop contribution from the reference.
pub trait FeedforwardElement {
    /// Power predicted for following `reference`.
    fn calculate(&self, reference: KineticState) -> f64;

    /// Clear any cached state. Model-based elements have none.
    fn reset(&mut self) {}
}

impl<F: Fn(KineticState) -> f64> FeedforwardElement for F {
    #[inline]
    fn calculate(&self, reference: KineticState) -> f64 {
        self(reference)
    }
}

/// Feedforward element that contributes nothing; for feedback-only systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedforward;

impl FeedforwardElement for NullFeedforward {
    #[inline]
    fn calculate(&self, _reference: KineticState) -> f64 {
        0.0
    }
}

/// Velocity, acceleration and static friction terms shared by every model.
///
/// Static friction opposes motion, so it is absent at zero reference velocity.
#[inline]
pub(crate) fn motor_terms(kv: f64, ka: f64, ks: f64, reference: KineticState) -> f64 {
    kv * reference.velocity + ka * reference.acceleration + ks * sign(reference.velocity)
}

// ─── Tests ──────────────────────────────────────────────────────────
