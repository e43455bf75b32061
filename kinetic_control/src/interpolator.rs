//! Goal interpolators.
//!
//! An [`InterpolatorElement`] holds the goal set by the application and turns
//! it into the reference the loop tracks on this tick. The reference may lag
//! the goal ([`FirstOrderEmaInterpolator`]) or follow a time-parameterized
//! trajectory toward it ([`TrapezoidInterpolator`]).

pub mod ema;
pub mod trapezoid;

pub use ema::{FirstOrderEmaInterpolator, FirstOrderEmaParameters};
pub use trapezoid::{TrapezoidInterpolator, TrapezoidProfile, TrapezoidProfileParameters};

use kinetic_common::state::KineticState;

/// Produces the reference the loop tracks.
pub trait InterpolatorElement {
    /// Goal most recently set.
    fn goal(&self) -> KineticState;

    /// Replace the goal.
    fn set_goal(&mut self, goal: KineticState);

    /// Reference for this tick. Pull-based interpolators advance on every call.
    fn current_reference(&mut self) -> KineticState;

    /// Clear any accumulated state (smoothing memory, profile start time).
    fn reset(&mut self) {}
}

/// Reference equals the goal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantInterpolator {
    goal: KineticState,
}

impl ConstantInterpolator {
    /// Interpolator holding `goal`.
    pub const fn new(goal: KineticState) -> Self {
        Self { goal }
    }
}

impl InterpolatorElement for ConstantInterpolator {
    #[inline]
    fn goal(&self) -> KineticState {
        self.goal
    }

    #[inline]
    fn set_goal(&mut self, goal: KineticState) {
        self.goal = goal;
    }

    #[inline]
    fn current_reference(&mut self) -> KineticState {
        self.goal
    }
}
