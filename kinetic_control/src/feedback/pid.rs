//! PID and SquID controllers with right-endpoint integration and
//! zero-crossing integral reset.
//!
//! ```text
//! error_sum += e · Δt                         (Δt in clock nanoseconds)
//! out        = P(e) + kI · error_sum + kD · d
//!
//! P(e) = kP · e                               (Linear)
//! P(e) = sign(e) · sqrt(kP · |e|)             (SquareRoot, "SquID")
//! ```
//!
//! The integral is a right-endpoint Riemann sum: each sample contributes
//! the *current* error times the time since the previous sample.
//!
//! First call after construction or [`PidController::reset`]: the error and
//! timestamp are recorded, nothing is integrated, and the output is
//! `P(e) + kD · d`. If no derivative term is supplied, the finite difference
//! `(e − last_error) / Δt` is used when Δt > 0 and zero otherwise.

use kinetic_common::state::KineticState;
use kinetic_common::time::{Clock, MonotonicClock, Timestamp};
use serde::{Deserialize, Serialize};

use super::{FeedbackElement, FeedbackType, sign};

/// PID gains.
///
/// Owned by the controller; change them through
/// [`PidController::set_gains`] rather than sharing a mutable object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidCoefficients {
    /// Proportional gain.
    #[serde(default)]
    pub kp: f64,
    /// Integral gain (per error·nanosecond).
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain.
    #[serde(default)]
    pub kd: f64,
}

impl PidCoefficients {
    /// Gains from explicit values.
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Proportional-only gains.
    pub const fn p(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }
}

/// Shape of the proportional term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProportionalLaw {
    /// `kP · e`.
    #[default]
    Linear,
    /// `sign(e) · sqrt(kP · |e|)`: aggressive far from the setpoint, soft near it.
    SquareRoot,
}

impl ProportionalLaw {
    #[inline]
    fn apply(self, kp: f64, error: f64) -> f64 {
        match self {
            Self::Linear => kp * error,
            Self::SquareRoot => sign(error) * (kp * error.abs()).sqrt(),
        }
    }
}

/// Time-integrating PID/SquID core.
///
/// Must be reset (via [`PidController::reset`]) when the loop is re-engaged
/// after a pause, otherwise the first Δt spans the whole pause.
#[derive(Debug, Clone)]
pub struct PidController {
    coefficients: PidCoefficients,
    law: ProportionalLaw,
    reset_integral_on_zero_crossover: bool,
    /// Error seen on the previous call.
    last_error: f64,
    /// Integral accumulator.
    error_sum: f64,
    /// `None` exactly until the first call.
    last_timestamp: Option<Timestamp>,
}

impl PidController {
    /// Linear PID with zero-crossing integral reset enabled.
    pub const fn new(coefficients: PidCoefficients) -> Self {
        Self::with_law(coefficients, ProportionalLaw::Linear)
    }

    /// Square-root-proportional (SquID) controller with zero-crossing reset enabled.
    pub const fn squid(coefficients: PidCoefficients) -> Self {
        Self::with_law(coefficients, ProportionalLaw::SquareRoot)
    }

    /// Controller with an explicit proportional law.
    pub const fn with_law(coefficients: PidCoefficients, law: ProportionalLaw) -> Self {
        Self {
            coefficients,
            law,
            reset_integral_on_zero_crossover: true,
            last_error: 0.0,
            error_sum: 0.0,
            last_timestamp: None,
        }
    }

    /// Enable or disable clearing the integral when the error changes sign.
    #[must_use]
    pub const fn reset_integral_on_zero_crossover(mut self, enabled: bool) -> Self {
        self.reset_integral_on_zero_crossover = enabled;
        self
    }

    /// One controller step.
    ///
    /// - `timestamp`: now, from the same clock as every previous call.
    /// - `error`: proportional/integrated error.
    /// - `derivative`: derivative error if measured; `None` falls back to a
    ///   finite difference of `error`.
    pub fn calculate(&mut self, timestamp: Timestamp, error: f64, derivative: Option<f64>) -> f64 {
        let PidCoefficients { kp, ki, kd } = self.coefficients;
        let proportional = self.law.apply(kp, error);

        let Some(last_timestamp) = self.last_timestamp else {
            self.last_error = error;
            self.last_timestamp = Some(timestamp);
            return proportional + kd * derivative.unwrap_or(0.0);
        };

        if self.reset_integral_on_zero_crossover && sign(self.last_error) != sign(error) {
            self.error_sum = 0.0;
        }

        let delta_t = timestamp.nanos_since(last_timestamp);
        self.error_sum += error * delta_t;

        let derivative = derivative.unwrap_or_else(|| {
            if delta_t > 0.0 {
                (error - self.last_error) / delta_t
            } else {
                0.0
            }
        });

        self.last_error = error;
        self.last_timestamp = Some(timestamp);

        proportional + ki * self.error_sum + kd * derivative
    }

    /// Return to the pre-first-call state. Gains are kept.
    pub fn reset(&mut self) {
        self.error_sum = 0.0;
        self.last_error = 0.0;
        self.last_timestamp = None;
    }

    /// Current gains.
    pub const fn coefficients(&self) -> PidCoefficients {
        self.coefficients
    }

    /// Replace the gains. The integral accumulator is kept.
    pub const fn set_coefficients(&mut self, coefficients: PidCoefficients) {
        self.coefficients = coefficients;
    }

    /// Replace the gains. The integral accumulator is kept.
    pub const fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.coefficients = PidCoefficients::new(kp, ki, kd);
    }

    /// Proportional law in use.
    pub const fn law(&self) -> ProportionalLaw {
        self.law
    }

    /// Integral accumulator (error·nanoseconds).
    pub const fn error_sum(&self) -> f64 {
        self.error_sum
    }

    /// Error seen on the previous call.
    pub const fn last_error(&self) -> f64 {
        self.last_error
    }

    /// Timestamp of the previous call, `None` before the first.
    pub const fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_timestamp
    }
}

// ─── Elements ───────────────────────────────────────────────────────

/// [`FeedbackElement`] driving a linear [`PidController`].
#[derive(Debug, Clone)]
pub struct PidElement<C: Clock = MonotonicClock> {
    feedback_type: FeedbackType,
    controller: PidController,
    clock: C,
}

impl<C: Clock> PidElement<C> {
    /// PID element reading time from `clock`.
    pub const fn new(feedback_type: FeedbackType, coefficients: PidCoefficients, clock: C) -> Self {
        Self::from_controller(feedback_type, PidController::new(coefficients), clock)
    }

    /// Wrap a preconfigured controller.
    pub const fn from_controller(
        feedback_type: FeedbackType,
        controller: PidController,
        clock: C,
    ) -> Self {
        Self {
            feedback_type,
            controller,
            clock,
        }
    }

    /// Enable or disable clearing the integral when the error changes sign.
    #[must_use]
    pub fn reset_integral_on_zero_crossover(mut self, enabled: bool) -> Self {
        self.controller = self.controller.reset_integral_on_zero_crossover(enabled);
        self
    }

    /// Step the controller at an explicit timestamp.
    pub fn calculate_at(&mut self, timestamp: Timestamp, error: KineticState) -> f64 {
        let (proportional, derivative) = self.feedback_type.select(error);
        self.controller
            .calculate(timestamp, proportional, Some(derivative))
    }

    /// Channels this element regulates.
    pub const fn feedback_type(&self) -> FeedbackType {
        self.feedback_type
    }

    /// Current gains.
    pub const fn coefficients(&self) -> PidCoefficients {
        self.controller.coefficients()
    }

    /// Hot-swap the gains.
    pub const fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.controller.set_gains(kp, ki, kd);
    }

    /// Underlying controller state.
    pub const fn controller(&self) -> &PidController {
        &self.controller
    }
}

impl<C: Clock> FeedbackElement for PidElement<C> {
    #[inline]
    fn calculate(&mut self, error: KineticState) -> f64 {
        let now = self.clock.now();
        self.calculate_at(now, error)
    }

    fn reset(&mut self) {
        self.controller.reset();
    }
}

/// [`FeedbackElement`] driving a square-root-proportional (SquID) controller.
#[derive(Debug, Clone)]
pub struct SquidElement<C: Clock = MonotonicClock> {
    inner: PidElement<C>,
}

impl<C: Clock> SquidElement<C> {
    /// SquID element reading time from `clock`.
    pub const fn new(feedback_type: FeedbackType, coefficients: PidCoefficients, clock: C) -> Self {
        Self {
            inner: PidElement::from_controller(
                feedback_type,
                PidController::squid(coefficients),
                clock,
            ),
        }
    }

    /// Enable or disable clearing the integral when the error changes sign.
    #[must_use]
    pub fn reset_integral_on_zero_crossover(mut self, enabled: bool) -> Self {
        self.inner = self.inner.reset_integral_on_zero_crossover(enabled);
        self
    }

    /// Step the controller at an explicit timestamp.
    pub fn calculate_at(&mut self, timestamp: Timestamp, error: KineticState) -> f64 {
        self.inner.calculate_at(timestamp, error)
    }

    /// Current gains.
    pub const fn coefficients(&self) -> PidCoefficients {
        self.inner.coefficients()
    }

    /// Hot-swap the gains.
    pub const fn set_gains(&mut self, kp: f64, ki: f64, kd: f64) {
        self.inner.set_gains(kp, ki, kd);
    }

    /// Underlying controller state.
    pub const fn controller(&self) -> &PidController {
        self.inner.controller()
    }
}

impl<C: Clock> FeedbackElement for SquidElement<C> {
    #[inline]
    fn calculate(&mut self, error: KineticState) -> f64 {
        self.inner.calculate(error)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
