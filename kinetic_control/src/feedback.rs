//! Feedback (error-driven) elements.
//!
//! A [`FeedbackElement`] turns the error between the reference and the
//! filtered measurement into a correction. Stateful variants integrate over
//! time through an injected [`Clock`](kinetic_common::time::Clock).

pub mod angular;
pub mod bang_bang;
pub mod pid;

pub use angular::{AngleType, AngularFeedback};
pub use bang_bang::BangBangElement;
pub use pid::{PidCoefficients, PidController, PidElement, ProportionalLaw, SquidElement};

use kinetic_common::state::KineticState;
use serde::{Deserialize, Serialize};

/// Computes a correction from the current error.
pub trait FeedbackElement {
    /// Power to apply for the given error (reference − measurement).
    fn calculate(&mut self, error: KineticState) -> f64;

    /// Clear any accumulated state.
    fn reset(&mut self) {}
}

impl<F: FnMut(KineticState) -> f64> FeedbackElement for F {
    #[inline]
    fn calculate(&mut self, error: KineticState) -> f64 {
        self(error)
    }
}

/// Which pair of error channels a controller acts on.
///
/// - `Position`: position error is the proportional/integrated term,
///   velocity error the derivative term.
/// - `Velocity`: velocity error is the proportional/integrated term,
///   acceleration error the derivative term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    /// Regulate position.
    #[default]
    Position,
    /// Regulate velocity.
    Velocity,
}

impl FeedbackType {
    /// `(proportional, derivative)` channels of `error` for this type.
    #[inline]
    pub const fn select(self, error: KineticState) -> (f64, f64) {
        match self {
            Self::Position => (error.position, error.velocity),
            Self::Velocity => (error.velocity, error.acceleration),
        }
    }
}

/// Feedback element that contributes nothing; for feedforward-only systems.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl FeedbackElement for NullFeedback {
    #[inline]
    fn calculate(&mut self, _error: KineticState) -> f64 {
        0.0
    }
}

/// Sign with a true zero: `-1`, `0` or `1`; NaN stays NaN.
#[inline]
pub(crate) fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        // 0.0, -0.0 and NaN
        x * 0.0
    }
}
