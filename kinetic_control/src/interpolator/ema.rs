//! First-order exponential moving average toward the goal.
//!
//! ```text
//! r[n] = alpha · goal + (1 - alpha) · r[n-1]
//! ```
//!
//! The recurrence advances once per [`current_reference`] call, not per unit
//! of time: reading twice moves the reference twice.
//!
//! [`current_reference`]: super::InterpolatorElement::current_reference

use kinetic_common::state::KineticState;
use serde::{Deserialize, Serialize};

use super::InterpolatorElement;
use crate::error::{ElementResult, check_unit_gain};

/// EMA interpolator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderEmaParameters {
    /// Weight of the goal, in `[0, 1]`.
    pub alpha: f64,
    /// Reference before the first access and after a reset.
    #[serde(default)]
    pub starting_reference: KineticState,
}

impl FirstOrderEmaParameters {
    /// Parameters starting from the zero state.
    pub const fn new(alpha: f64) -> Self {
        Self {
            alpha,
            starting_reference: KineticState::ZERO,
        }
    }
}

/// Pull-based single-pole smoother.
#[derive(Debug, Clone)]
pub struct FirstOrderEmaInterpolator {
    parameters: FirstOrderEmaParameters,
    goal: KineticState,
    last_reference: KineticState,
}

impl FirstOrderEmaInterpolator {
    /// Create an interpolator with a zero goal.
    ///
    /// # Errors
    ///
    /// [`ElementError::GainOutOfRange`](crate::error::ElementError::GainOutOfRange)
    /// if `alpha` is outside `[0, 1]`.
    pub fn new(parameters: FirstOrderEmaParameters) -> ElementResult<Self> {
        check_unit_gain("ema", parameters.alpha)?;
        Ok(Self {
            parameters,
            goal: KineticState::ZERO,
            last_reference: parameters.starting_reference,
        })
    }

    pub const fn parameters(&self) -> FirstOrderEmaParameters {
        self.parameters
    }

    /// Replace the smoothing gain; the current reference is kept.
    ///
    /// # Errors
    ///
    /// Rejects `alpha` outside `[0, 1]`; the interpolator is left unchanged.
    pub fn set_alpha(&mut self, alpha: f64) -> ElementResult<()> {
        self.parameters.alpha = check_unit_gain("ema", alpha)?;
        Ok(())
    }

    /// Reference produced by the last access, without advancing.
    pub const fn last_reference(&self) -> KineticState {
        self.last_reference
    }
}

impl InterpolatorElement for FirstOrderEmaInterpolator {
    fn goal(&self) -> KineticState {
        self.goal
    }

    fn set_goal(&mut self, goal: KineticState) {
        self.goal = goal;
    }

    #[inline]
    fn current_reference(&mut self) -> KineticState {
        let alpha = self.parameters.alpha;
        self.last_reference = self.goal * alpha + self.last_reference * (1.0 - alpha);
        self.last_reference
    }

    fn reset(&mut self) {
        self.last_reference = self.parameters.starting_reference;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ElementError;

    fn ema(alpha: f64) -> FirstOrderEmaInterpolator {
        FirstOrderEmaInterpolator::new(FirstOrderEmaParameters::new(alpha)).unwrap()
    }

    #[test]
    fn halves_the_gap_on_each_access() {
        let mut i = ema(0.5);
        i.set_goal(KineticState::from_position(5.0));
        let positions: Vec<f64> = (0..5).map(|_| i.current_reference().position).collect();
        assert_eq!(positions, vec![2.5, 3.75, 4.375, 4.6875, 4.84375]);
    }

    #[test]
    fn smooths_every_channel() {
        let mut i = ema(0.25);
        i.set_goal(KineticState::new(4.0, 8.0, -4.0));
        assert_eq!(i.current_reference(), KineticState::new(1.0, 2.0, -1.0));
    }

    #[test]
    fn alpha_one_jumps_to_goal() {
        let mut i = ema(1.0);
        i.set_goal(KineticState::from_position(9.0));
        assert_eq!(i.current_reference().position, 9.0);
    }

    #[test]
    fn alpha_zero_holds_start() {
        let mut i = FirstOrderEmaInterpolator::new(FirstOrderEmaParameters {
            alpha: 0.0,
            starting_reference: KineticState::from_position(2.0),
        })
        .unwrap();
        i.set_goal(KineticState::from_position(100.0));
        for _ in 0..3 {
            assert_eq!(i.current_reference().position, 2.0);
        }
    }

    #[test]
    fn reading_goal_does_not_advance() {
        let mut i = ema(0.5);
        i.set_goal(KineticState::from_position(5.0));
        let _ = i.goal();
        assert_eq!(i.last_reference(), KineticState::ZERO);
        assert_eq!(i.current_reference().position, 2.5);
    }

    #[test]
    fn reset_returns_to_start() {
        let mut i = ema(0.5);
        i.set_goal(KineticState::from_position(5.0));
        i.current_reference();
        i.current_reference();
        i.reset();
        assert_eq!(i.last_reference(), KineticState::ZERO);
        assert_eq!(i.goal(), KineticState::from_position(5.0));
        assert_eq!(i.current_reference().position, 2.5);
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let err = FirstOrderEmaInterpolator::new(FirstOrderEmaParameters::new(1.01)).unwrap_err();
        assert!(matches!(err, ElementError::GainOutOfRange { element: "ema", .. }));
        let mut i = ema(0.5);
        assert!(i.set_alpha(-0.5).is_err());
        assert_eq!(i.parameters().alpha, 0.5);
    }
}
