//! Fluent construction of a [`ControlSystem`].
//!
//! ```rust
//! use kinetic_common::state::KineticState;
//! use kinetic_common::time::ManualClock;
//! use kinetic_control::builder::ControlSystemBuilder;
//!
//! let mut system = ControlSystemBuilder::with_clock(ManualClock::new())
//!     .pos_pid(1.0, 0.0, 0.1)
//!     .elevator_ff(0.2, 0.0, 0.0, 0.0)
//!     .pos_filter(|f| f.low_pass(0.3, 0.0))
//!     .trapezoid_interpolator(2.0, 4.0, 4.0)
//!     .build()
//!     .unwrap();
//!
//! system.set_goal(KineticState::from_position(1.0));
//! let power = system.calculate(KineticState::ZERO);
//! assert!(power.is_finite());
//! ```
//!
//! Every slot is optional: no feedback contributes 0, no feedforward
//! contributes 0, unconfigured filter channels pass through, and the default
//! interpolator hands the goal straight back. Steps that validate parameters
//! record the first failure, which [`ControlSystemBuilder::build`] returns.

use kinetic_common::state::KineticState;
use kinetic_common::time::{Clock, MonotonicClock};

use crate::error::{ElementError, ElementResult};
use crate::feedback::{
    AngleType, AngularFeedback, BangBangElement, FeedbackElement, FeedbackType, NullFeedback,
    PidCoefficients, PidElement, SquidElement,
};
use crate::feedforward::{
    ArmFeedforward, BasicFeedforward, BasicFeedforwardParameters, ElevatorFeedforward,
    FeedforwardElement, GravityFeedforwardParameters, NullFeedforward,
};
use crate::filter::{ChainedFilter, Filter, FilterElement, LowPassFilter, PassThroughFilter};
use crate::interpolator::{
    ConstantInterpolator, FirstOrderEmaInterpolator, FirstOrderEmaParameters,
    InterpolatorElement, TrapezoidInterpolator, TrapezoidProfileParameters,
};
use crate::system::ControlSystem;

/// Builder for a [`ControlSystem`].
///
/// Time-dependent elements share the builder's clock.
pub struct ControlSystemBuilder<C: Clock + Clone + 'static = MonotonicClock> {
    clock: C,
    feedback: Option<Box<dyn FeedbackElement>>,
    feedforward: Option<Box<dyn FeedforwardElement>>,
    position_filter: Option<Box<dyn Filter>>,
    velocity_filter: Option<Box<dyn Filter>>,
    acceleration_filter: Option<Box<dyn Filter>>,
    interpolator: Option<Box<dyn InterpolatorElement>>,
    error: Option<ElementError>,
}

impl ControlSystemBuilder<MonotonicClock> {
    /// Builder reading wall-clock monotonic time.
    pub fn new() -> Self {
        Self::with_clock(MonotonicClock::new())
    }
}

impl Default for ControlSystemBuilder<MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + Clone + 'static> ControlSystemBuilder<C> {
    /// Builder whose time-dependent elements read `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            feedback: None,
            feedforward: None,
            position_filter: None,
            velocity_filter: None,
            acceleration_filter: None,
            interpolator: None,
            error: None,
        }
    }

    fn record<T>(&mut self, result: ElementResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
                None
            }
        }
    }

    fn feedback_builder(&self) -> FeedbackBuilder<C> {
        FeedbackBuilder::new(self.clock.clone())
    }

    fn set_feedback(mut self, builder: FeedbackBuilder<C>) -> Self {
        self.feedback = Some(builder.into_element());
        self
    }

    // ─── Feedback ───────────────────────────────────────────────────

    /// Any feedback element.
    #[must_use]
    pub fn feedback(mut self, element: impl FeedbackElement + 'static) -> Self {
        self.feedback = Some(Box::new(element));
        self
    }

    /// PID on position error, velocity error as derivative.
    #[must_use]
    pub fn pos_pid(self, kp: f64, ki: f64, kd: f64) -> Self {
        let b = self.feedback_builder().pos_pid(kp, ki, kd);
        self.set_feedback(b)
    }

    /// PID on velocity error, acceleration error as derivative.
    #[must_use]
    pub fn vel_pid(self, kp: f64, ki: f64, kd: f64) -> Self {
        let b = self.feedback_builder().vel_pid(kp, ki, kd);
        self.set_feedback(b)
    }

    /// SquID on position error.
    #[must_use]
    pub fn pos_squid(self, kp: f64, ki: f64, kd: f64) -> Self {
        let b = self.feedback_builder().pos_squid(kp, ki, kd);
        self.set_feedback(b)
    }

    /// SquID on velocity error.
    #[must_use]
    pub fn vel_squid(self, kp: f64, ki: f64, kd: f64) -> Self {
        let b = self.feedback_builder().vel_squid(kp, ki, kd);
        self.set_feedback(b)
    }

    /// Bang-bang on the given channel.
    #[must_use]
    pub fn bang_bang(self, feedback_type: FeedbackType) -> Self {
        let b = self.feedback_builder().bang_bang(feedback_type);
        self.set_feedback(b)
    }

    /// Feedback that normalizes angular position error before delegating
    /// to the element configured by `configure`.
    #[must_use]
    pub fn angular(
        self,
        angle_type: AngleType,
        configure: impl FnOnce(FeedbackBuilder<C>) -> FeedbackBuilder<C>,
    ) -> Self {
        let inner = configure(self.feedback_builder()).into_element();
        self.feedback(AngularFeedback::new(angle_type, BoxedFeedback(inner)))
    }

    // ─── Feedforward ────────────────────────────────────────────────

    /// Any feedforward element.
    #[must_use]
    pub fn feedforward(mut self, element: impl FeedforwardElement + 'static) -> Self {
        self.feedforward = Some(Box::new(element));
        self
    }

    /// `kV × v + kA × a + kS × sign(v)`.
    #[must_use]
    pub fn basic_ff(self, kv: f64, ka: f64, ks: f64) -> Self {
        self.feedforward(BasicFeedforward::new(BasicFeedforwardParameters::new(
            kv, ka, ks,
        )))
    }

    /// Basic model plus a constant gravity term.
    #[must_use]
    pub fn elevator_ff(self, kg: f64, kv: f64, ka: f64, ks: f64) -> Self {
        self.feedforward(ElevatorFeedforward::new(GravityFeedforwardParameters::new(
            kg, kv, ka, ks,
        )))
    }

    /// Basic model plus gravity scaled by the cosine of the position (radians).
    #[must_use]
    pub fn arm_ff(self, kg: f64, kv: f64, ka: f64, ks: f64) -> Self {
        self.feedforward(ArmFeedforward::new(GravityFeedforwardParameters::new(
            kg, kv, ka, ks,
        )))
    }

    // ─── Filters ────────────────────────────────────────────────────

    /// Filters for the position channel.
    #[must_use]
    pub fn pos_filter(mut self, configure: impl FnOnce(FilterBuilder) -> FilterBuilder) -> Self {
        let filter = configure(FilterBuilder::new()).build();
        self.position_filter = self.record(filter);
        self
    }

    /// Filters for the velocity channel.
    #[must_use]
    pub fn vel_filter(mut self, configure: impl FnOnce(FilterBuilder) -> FilterBuilder) -> Self {
        let filter = configure(FilterBuilder::new()).build();
        self.velocity_filter = self.record(filter);
        self
    }

    /// Filters for the acceleration channel.
    #[must_use]
    pub fn accel_filter(mut self, configure: impl FnOnce(FilterBuilder) -> FilterBuilder) -> Self {
        let filter = configure(FilterBuilder::new()).build();
        self.acceleration_filter = self.record(filter);
        self
    }

    // ─── Interpolators ──────────────────────────────────────────────

    /// Any interpolator.
    #[must_use]
    pub fn interpolator(mut self, element: impl InterpolatorElement + 'static) -> Self {
        self.interpolator = Some(Box::new(element));
        self
    }

    /// Exponential moving average toward the goal, starting at zero.
    #[must_use]
    pub fn ema_interpolator(mut self, alpha: f64) -> Self {
        let ema = FirstOrderEmaInterpolator::new(FirstOrderEmaParameters::new(alpha));
        if let Some(ema) = self.record(ema) {
            self.interpolator = Some(Box::new(ema));
        }
        self
    }

    /// Trapezoid motion profile toward the goal.
    #[must_use]
    pub fn trapezoid_interpolator(mut self, max_vel: f64, accel: f64, decel: f64) -> Self {
        let params = TrapezoidProfileParameters::new(max_vel, accel, decel);
        if let Some(params) = self.record(params) {
            let clock = self.clock.clone();
            self.interpolator = Some(Box::new(TrapezoidInterpolator::new(params, clock)));
        }
        self
    }

    /// Assemble the control system.
    ///
    /// # Errors
    ///
    /// The first error recorded by a validating step.
    pub fn build(self) -> ElementResult<ControlSystem> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let filter = FilterElement::new(
            self.position_filter.unwrap_or_else(|| Box::new(PassThroughFilter)),
            self.velocity_filter.unwrap_or_else(|| Box::new(PassThroughFilter)),
            self.acceleration_filter.unwrap_or_else(|| Box::new(PassThroughFilter)),
        );

        Ok(ControlSystem::new(
            self.feedback.unwrap_or_else(|| Box::new(NullFeedback)),
            self.feedforward.unwrap_or_else(|| Box::new(NullFeedforward)),
            filter,
            self.interpolator
                .unwrap_or_else(|| Box::new(ConstantInterpolator::new(KineticState::ZERO))),
        ))
    }
}

// ─── Feedback builder ───────────────────────────────────────────────

/// Chooses one feedback element; the last call wins.
pub struct FeedbackBuilder<C: Clock + Clone + 'static = MonotonicClock> {
    clock: C,
    element: Option<Box<dyn FeedbackElement>>,
}

impl<C: Clock + Clone + 'static> FeedbackBuilder<C> {
    fn new(clock: C) -> Self {
        Self {
            clock,
            element: None,
        }
    }

    fn into_element(self) -> Box<dyn FeedbackElement> {
        self.element.unwrap_or_else(|| Box::new(NullFeedback))
    }

    fn pid(mut self, feedback_type: FeedbackType, kp: f64, ki: f64, kd: f64) -> Self {
        let coefficients = PidCoefficients::new(kp, ki, kd);
        let clock = self.clock.clone();
        self.element = Some(Box::new(PidElement::new(feedback_type, coefficients, clock)));
        self
    }

    fn squid(mut self, feedback_type: FeedbackType, kp: f64, ki: f64, kd: f64) -> Self {
        let coefficients = PidCoefficients::new(kp, ki, kd);
        let clock = self.clock.clone();
        self.element = Some(Box::new(SquidElement::new(feedback_type, coefficients, clock)));
        self
    }

    /// Any feedback element.
    #[must_use]
    pub fn custom(mut self, element: impl FeedbackElement + 'static) -> Self {
        self.element = Some(Box::new(element));
        self
    }

    /// PID on position error.
    #[must_use]
    pub fn pos_pid(self, kp: f64, ki: f64, kd: f64) -> Self {
        self.pid(FeedbackType::Position, kp, ki, kd)
    }

    /// PID on velocity error.
    #[must_use]
    pub fn vel_pid(self, kp: f64, ki: f64, kd: f64) -> Self {
        self.pid(FeedbackType::Velocity, kp, ki, kd)
    }

    /// SquID on position error.
    #[must_use]
    pub fn pos_squid(self, kp: f64, ki: f64, kd: f64) -> Self {
        self.squid(FeedbackType::Position, kp, ki, kd)
    }

    /// SquID on velocity error.
    #[must_use]
    pub fn vel_squid(self, kp: f64, ki: f64, kd: f64) -> Self {
        self.squid(FeedbackType::Velocity, kp, ki, kd)
    }

    /// Bang-bang on the given channel.
    #[must_use]
    pub fn bang_bang(mut self, feedback_type: FeedbackType) -> Self {
        self.element = Some(Box::new(BangBangElement::new(feedback_type)));
        self
    }
}

/// Lets a type-erased element sit inside a generic decorator.
pub(crate) struct BoxedFeedback(pub(crate) Box<dyn FeedbackElement>);

impl FeedbackElement for BoxedFeedback {
    #[inline]
    fn calculate(&mut self, error: KineticState) -> f64 {
        self.0.calculate(error)
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

// ─── Filter builder ─────────────────────────────────────────────────

/// Collects the filters for one channel, applied in the order added.
#[derive(Default)]
pub struct FilterBuilder {
    filters: Vec<Box<dyn Filter>>,
    error: Option<ElementError>,
}

impl FilterBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a low-pass filter.
    #[must_use]
    pub fn low_pass(mut self, alpha: f64, starting_estimate: f64) -> Self {
        match LowPassFilter::with_alpha(alpha, starting_estimate) {
            Ok(filter) => self.filters.push(Box::new(filter)),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
            }
        }
        self
    }

    /// Append any filter.
    #[must_use]
    pub fn custom(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// None → pass-through, one → that filter, more → a chain.
    pub(crate) fn build(mut self) -> ElementResult<Box<dyn Filter>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.filters.len() > 1 {
            return Ok(Box::new(ChainedFilter::new(self.filters)?));
        }
        Ok(self
            .filters
            .pop()
            .unwrap_or_else(|| Box::new(PassThroughFilter)))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MAX_CHAINED_FILTERS;
    use kinetic_common::time::ManualClock;

    fn builder() -> (ControlSystemBuilder<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        (ControlSystemBuilder::with_clock(clock.clone()), clock)
    }

    #[test]
    fn empty_builder_outputs_zero() {
        let (b, _) = builder();
        let mut cs = b.build().unwrap();
        cs.set_goal(KineticState::from_position(10.0));
        assert_eq!(cs.calculate(KineticState::ZERO), 0.0);
        assert_eq!(cs.last_reference().position, 10.0);
    }

    #[test]
    fn pos_pid_and_elevator_ff() {
        let (b, _) = builder();
        let mut cs = b.pos_pid(2.0, 0.0, 0.0).elevator_ff(0.5, 0.0, 0.0, 0.0).build().unwrap();
        cs.set_goal(KineticState::from_position(3.0));
        assert_eq!(cs.calculate(KineticState::from_position(1.0)), 4.5);
    }

    #[test]
    fn vel_pid_regulates_velocity() {
        let (b, _) = builder();
        let mut cs = b.vel_pid(1.0, 0.0, 0.0).build().unwrap();
        cs.set_goal(KineticState::new(100.0, 4.0, 0.0));
        assert_eq!(cs.calculate(KineticState::new(0.0, 1.0, 0.0)), 3.0);
    }

    #[test]
    fn squid_variants() {
        let (b, _) = builder();
        let mut cs = b.pos_squid(1.0, 0.0, 0.0).build().unwrap();
        cs.set_goal(KineticState::from_position(16.0));
        assert_eq!(cs.calculate(KineticState::ZERO), 4.0);

        let (b, _) = builder();
        let mut cs = b.vel_squid(4.0, 0.0, 0.0).build().unwrap();
        cs.set_goal(KineticState::new(0.0, -1.0, 0.0));
        assert_eq!(cs.calculate(KineticState::ZERO), -2.0);
    }

    #[test]
    fn pid_shares_builder_clock() {
        let (b, clock) = builder();
        let mut cs = b.pos_pid(0.0, 1.0, 0.0).build().unwrap();
        cs.set_goal(KineticState::from_position(10.0));
        let mut outputs = Vec::new();
        for t in 1..=3 {
            clock.set_nanos(t);
            outputs.push(cs.calculate(KineticState::ZERO));
        }
        assert_eq!(outputs, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn angular_wraps_inner_feedback() {
        let (b, _) = builder();
        let mut cs = b
            .angular(AngleType::Degrees, |f| f.pos_pid(1.0, 0.0, 0.0))
            .build()
            .unwrap();
        cs.set_goal(KineticState::from_position(359.0));
        assert!((cs.calculate(KineticState::ZERO) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn angular_with_empty_inner_is_zero() {
        let (b, _) = builder();
        let mut cs = b.angular(AngleType::Radians, |f| f).build().unwrap();
        cs.set_goal(KineticState::from_position(1.0));
        assert_eq!(cs.calculate(KineticState::ZERO), 0.0);
    }

    #[test]
    fn bang_bang_feedback() {
        let (b, _) = builder();
        let mut cs = b.bang_bang(FeedbackType::Position).build().unwrap();
        cs.set_goal(KineticState::from_position(-2.0));
        assert_eq!(cs.calculate(KineticState::ZERO), -1.0);
    }

    #[test]
    fn arm_and_basic_ff() {
        let (b, _) = builder();
        let mut cs = b.arm_ff(1.0, 0.0, 0.0, 0.0).build().unwrap();
        assert_eq!(cs.calculate_open_loop(), 1.0);

        let (b, _) = builder();
        let mut cs = b.basic_ff(2.0, 0.0, 0.0).build().unwrap();
        cs.set_goal(KineticState::new(0.0, 1.5, 0.0));
        assert_eq!(cs.calculate_open_loop(), 3.0);
    }

    #[test]
    fn filters_per_channel() {
        let (b, _) = builder();
        let mut cs = b
            .feedback(|e: KineticState| e.position + e.velocity)
            .pos_filter(|f| f.low_pass(0.5, 0.0))
            .vel_filter(|f| f.custom(|x: f64| 2.0 * x))
            .build()
            .unwrap();
        // position filtered to 5, velocity doubled to 2
        assert_eq!(cs.calculate(KineticState::new(10.0, 1.0, 0.0)), -7.0);
    }

    #[test]
    fn several_filters_chain_in_order() {
        let (b, _) = builder();
        let mut cs = b
            .pos_filter(|f| f.custom(|x: f64| x + 1.0).custom(|x: f64| x * 10.0))
            .build()
            .unwrap();
        cs.calculate(KineticState::from_position(1.0));
        assert_eq!(cs.last_measurement().position, 20.0);
    }

    #[test]
    fn ema_interpolator_slot() {
        let (b, _) = builder();
        let mut cs = b.ema_interpolator(0.5).build().unwrap();
        cs.set_goal(KineticState::from_position(5.0));
        cs.calculate_open_loop();
        assert_eq!(cs.last_reference().position, 2.5);
    }

    #[test]
    fn trapezoid_interpolator_shares_clock() {
        let (b, clock) = builder();
        let mut cs = b.trapezoid_interpolator(10.0, 5.0, 5.0).build().unwrap();
        cs.set_goal(KineticState::from_position(20.0));
        cs.calculate_open_loop();
        clock.set_nanos(500_000_000);
        cs.calculate_open_loop();
        assert!((cs.last_reference().position - 0.625).abs() < 1e-9);
    }

    #[test]
    fn first_error_is_reported() {
        let (b, _) = builder();
        let err = b
            .ema_interpolator(2.0)
            .trapezoid_interpolator(1.0, -1.0, 1.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ElementError::GainOutOfRange { element: "ema", .. }));
    }

    #[test]
    fn bad_filter_gain_is_reported() {
        let (b, _) = builder();
        let err = b.pos_filter(|f| f.low_pass(1.5, 0.0)).build().unwrap_err();
        assert!(matches!(err, ElementError::GainOutOfRange { element: "low pass", .. }));
    }

    #[test]
    fn overfull_chain_is_reported() {
        let (b, _) = builder();
        let err = b
            .pos_filter(|mut f| {
                for _ in 0..=MAX_CHAINED_FILTERS {
                    f = f.custom(|x: f64| x);
                }
                f
            })
            .build()
            .unwrap_err();
        assert_eq!(err, ElementError::FilterChainFull { capacity: MAX_CHAINED_FILTERS });
    }
}
