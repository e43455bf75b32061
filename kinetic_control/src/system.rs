//! Control system composition.
//!
//! One [`ControlSystem::calculate`] call is one tick of the loop:
//!
//! ```text
//! filtered  = filter(measurement)
//! reference = interpolator.current_reference()      (read once per tick)
//! error     = reference − filtered
//! output    = feedback(error) + feedforward(reference)
//! ```
//!
//! A control system is driven from a single loop; nothing in it is
//! synchronized.

use core::fmt;

use kinetic_common::state::KineticState;
use tracing::{debug, trace};

use crate::feedback::FeedbackElement;
use crate::feedforward::FeedforwardElement;
use crate::filter::FilterElement;
use crate::interpolator::InterpolatorElement;

/// A complete control loop: one element of each kind.
pub struct ControlSystem {
    feedback: Box<dyn FeedbackElement>,
    feedforward: Box<dyn FeedforwardElement>,
    filter: FilterElement,
    interpolator: Box<dyn InterpolatorElement>,
    /// Filtered measurement seen on the last tick.
    last_measurement: KineticState,
    /// Reference used on the last tick.
    last_reference: KineticState,
}

impl ControlSystem {
    /// Assemble a control system from its four elements.
    ///
    /// See [`ControlSystemBuilder`](crate::builder::ControlSystemBuilder) for
    /// a more convenient way to build one.
    pub fn new(
        feedback: Box<dyn FeedbackElement>,
        feedforward: Box<dyn FeedforwardElement>,
        filter: FilterElement,
        interpolator: Box<dyn InterpolatorElement>,
    ) -> Self {
        debug!(goal = ?interpolator.goal(), "control system assembled");
        Self {
            feedback,
            feedforward,
            filter,
            interpolator,
            last_measurement: KineticState::ZERO,
            last_reference: KineticState::ZERO,
        }
    }

    /// Compute the output for this tick from a raw measurement.
    #[inline]
    pub fn calculate(&mut self, measurement: KineticState) -> f64 {
        let filtered = self.filter.filter(measurement);
        let reference = self.interpolator.current_reference();
        let error = reference - filtered;

        let feedback = self.feedback.calculate(error);
        let feedforward = self.feedforward.calculate(reference);
        let output = feedback + feedforward;

        self.last_measurement = filtered;
        self.last_reference = reference;

        trace!(?reference, ?error, feedback, feedforward, output, "tick");
        output
    }

    /// Tick with a zero measurement, for feedforward-only systems.
    #[inline]
    pub fn calculate_open_loop(&mut self) -> f64 {
        self.calculate(KineticState::ZERO)
    }

    /// Goal of the interpolator.
    pub fn goal(&self) -> KineticState {
        self.interpolator.goal()
    }

    /// Replace the goal of the interpolator.
    pub fn set_goal(&mut self, goal: KineticState) {
        debug!(?goal, "goal changed");
        self.interpolator.set_goal(goal);
    }

    /// Reset every element: integrators, filter memory and profile start times.
    /// The last measurement and reference return to zero.
    ///
    /// Call when the loop is re-engaged after a pause.
    pub fn reset(&mut self) {
        debug!("control system reset");
        self.last_measurement = KineticState::ZERO;
        self.last_reference = KineticState::ZERO;
        self.feedback.reset();
        self.feedforward.reset();
        self.filter.reset();
        self.interpolator.reset();
    }

    /// Whether the last filtered measurement is within `tolerance` of the goal
    /// on every channel.
    pub fn is_within_tolerance(&self, tolerance: KineticState) -> bool {
        let deviation = (self.goal() - self.last_measurement).abs();
        deviation.position <= tolerance.position
            && deviation.velocity <= tolerance.velocity
            && deviation.acceleration <= tolerance.acceleration
    }

    /// Filtered measurement from the last tick.
    pub const fn last_measurement(&self) -> KineticState {
        self.last_measurement
    }

    /// Reference from the last tick, without advancing the interpolator.
    pub const fn last_reference(&self) -> KineticState {
        self.last_reference
    }
}

impl fmt::Debug for ControlSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSystem")
            .field("filter", &self.filter)
            .field("last_measurement", &self.last_measurement)
            .field("last_reference", &self.last_reference)
            .finish_non_exhaustive()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
