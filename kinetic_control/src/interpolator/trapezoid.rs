//! Trapezoidal motion profile.
//!
//! Moves from position 0 to `goal.position` in three phases:
//!
//! ```text
//!   v
//!   │     ┌───────────┐            accel:  0 < t ≤ tA          a = +accel
//!   │    /             \           cruise: tA < t ≤ tA + tC    a = 0
//!   │   /               \          decel:  tA + tC < t < end   a = -decel
//!   └──┴─────────────────┴── t
//!      0  tA         tA+tC  end
//! ```
//!
//! Every sample is evaluated in closed form from the phase boundaries, so the
//! profile can be sampled at any rate, in any order, and changing the goal
//! reshapes all three phases immediately.
//!
//! When the distance is too short to reach `max_vel`, the cruise velocity is
//! lowered to the peak `sqrt(2·d·a·b / (a + b))` and the cruise phase has zero
//! length. Once the profile ends it holds the goal at rest.

use kinetic_common::prelude::NANOS_PER_SECOND;
use kinetic_common::state::KineticState;
use kinetic_common::time::{Clock, MonotonicClock, Timestamp};

use super::InterpolatorElement;
use crate::error::{ElementError, ElementResult};
use crate::feedback::sign;

/// Velocity and acceleration limits of a trapezoid profile.
///
/// All three limits are non-zero, finite, and share one sign. Only their
/// magnitudes shape the profile; the direction comes from the goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidProfileParameters {
    max_vel: f64,
    accel: f64,
    decel: f64,
}

impl TrapezoidProfileParameters {
    /// Limits in units/s and units/s².
    ///
    /// # Errors
    ///
    /// [`ElementError::InvalidProfile`] if any limit is zero, NaN or infinite,
    /// or if the limits disagree in sign.
    pub fn new(max_vel: f64, accel: f64, decel: f64) -> ElementResult<Self> {
        let limits = [max_vel, accel, decel];
        let usable = limits.iter().all(|x| x.is_finite() && *x != 0.0);
        let same_sign = limits.iter().all(|x| *x > 0.0) || limits.iter().all(|x| *x < 0.0);
        if !(usable && same_sign) {
            return Err(ElementError::InvalidProfile {
                max_vel,
                accel,
                decel,
            });
        }
        Ok(Self {
            max_vel,
            accel,
            decel,
        })
    }

    /// Equal acceleration and deceleration.
    pub fn symmetric(max_vel: f64, accel: f64) -> ElementResult<Self> {
        Self::new(max_vel, accel, accel)
    }

    /// Cruise velocity limit.
    pub const fn max_vel(&self) -> f64 {
        self.max_vel
    }

    /// Acceleration used to speed up.
    pub const fn accel(&self) -> f64 {
        self.accel
    }

    /// Acceleration used to slow down.
    pub const fn decel(&self) -> f64 {
        self.decel
    }
}

/// Phase boundaries for one goal, all in the direction-free frame.
#[derive(Debug, Clone, Copy)]
struct Phases {
    accel: f64,
    decel: f64,
    cruise_vel: f64,
    t_accel: f64,
    t_cruise: f64,
    t_decel: f64,
}

impl Phases {
    fn new(params: &TrapezoidProfileParameters, distance: f64) -> Self {
        let accel = params.accel.abs();
        let decel = params.decel.abs();
        let max_vel = params.max_vel.abs();

        let ramp_distance = max_vel * max_vel / (2.0 * accel) + max_vel * max_vel / (2.0 * decel);
        let cruise_vel = if ramp_distance > distance {
            (2.0 * distance * accel * decel / (accel + decel)).sqrt()
        } else {
            max_vel
        };

        let t_accel = cruise_vel / accel;
        let t_decel = cruise_vel / decel;
        let cruise_distance =
            distance - (0.5 * accel * t_accel * t_accel + 0.5 * decel * t_decel * t_decel);
        // rounding can leave a triangular profile a hair below zero
        let t_cruise = (cruise_distance / cruise_vel).max(0.0);

        Self {
            accel,
            decel,
            cruise_vel,
            t_accel,
            t_cruise,
            t_decel,
        }
    }

    #[inline]
    fn decel_start(&self) -> f64 {
        self.t_accel + self.t_cruise
    }

    #[inline]
    fn end(&self) -> f64 {
        self.decel_start() + self.t_decel
    }

    /// `(position, velocity, acceleration)` at `t > 0`, before the end.
    #[inline]
    fn sample(&self, t: f64) -> (f64, f64, f64) {
        let accel_end = 0.5 * self.accel * self.t_accel * self.t_accel;
        if t <= self.t_accel {
            (0.5 * self.accel * t * t, self.accel * t, self.accel)
        } else if t <= self.decel_start() {
            let tau = t - self.t_accel;
            (accel_end + self.cruise_vel * tau, self.cruise_vel, 0.0)
        } else {
            let tau = t - self.decel_start();
            let x0 = accel_end + self.cruise_vel * self.t_cruise;
            (
                x0 + self.cruise_vel * tau - 0.5 * self.decel * tau * tau,
                self.cruise_vel - self.decel * tau,
                -self.decel,
            )
        }
    }
}

/// Trapezoid profile from rest at 0 to rest at `goal.position`.
///
/// Only the goal's position channel is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidProfile {
    parameters: TrapezoidProfileParameters,
    /// Target; may be changed at any time.
    pub goal: KineticState,
}

impl TrapezoidProfile {
    /// Profile toward the zero goal.
    pub const fn new(parameters: TrapezoidProfileParameters) -> Self {
        Self {
            parameters,
            goal: KineticState::ZERO,
        }
    }

    /// Current limits.
    pub const fn parameters(&self) -> TrapezoidProfileParameters {
        self.parameters
    }

    /// Replace the limits.
    pub const fn set_parameters(&mut self, parameters: TrapezoidProfileParameters) {
        self.parameters = parameters;
    }

    fn phases(&self) -> Phases {
        Phases::new(&self.parameters, self.goal.position.abs())
    }

    /// Length of the acceleration phase in seconds.
    pub fn accel_duration(&self) -> f64 {
        self.phases().t_accel
    }

    /// Total profile length in seconds.
    pub fn duration(&self) -> f64 {
        self.phases().end()
    }

    /// State `t` seconds after the start.
    ///
    /// `t ≤ 0` yields the zero state; `t` at or past the end yields the goal
    /// position at rest.
    pub fn sample(&self, t: f64) -> KineticState {
        if t.is_nan() || t <= 0.0 || self.goal.position == 0.0 {
            return KineticState::ZERO;
        }

        let direction = sign(self.goal.position);
        let phases = self.phases();
        if t >= phases.end() {
            return KineticState::from_position(self.goal.position);
        }

        let (position, velocity, acceleration) = phases.sample(t);
        KineticState::new(position, velocity, acceleration) * direction
    }
}

/// Interpolator that follows a [`TrapezoidProfile`] in wall time.
///
/// The start time is captured on the first [`current_reference`] call after
/// construction or reset. Changing the goal does not restart the profile.
///
/// [`current_reference`]: InterpolatorElement::current_reference
#[derive(Debug, Clone)]
pub struct TrapezoidInterpolator<C: Clock = MonotonicClock> {
    profile: TrapezoidProfile,
    clock: C,
    start: Option<Timestamp>,
}

impl<C: Clock> TrapezoidInterpolator<C> {
    /// Interpolator toward the zero goal, timed by `clock`.
    pub const fn new(parameters: TrapezoidProfileParameters, clock: C) -> Self {
        Self {
            profile: TrapezoidProfile::new(parameters),
            clock,
            start: None,
        }
    }

    /// Profile being followed.
    pub const fn profile(&self) -> &TrapezoidProfile {
        &self.profile
    }

    /// Replace the limits; the start time is kept.
    pub const fn set_parameters(&mut self, parameters: TrapezoidProfileParameters) {
        self.profile.set_parameters(parameters);
    }

    /// When the profile started, if it has.
    pub const fn start(&self) -> Option<Timestamp> {
        self.start
    }
}

impl<C: Clock> InterpolatorElement for TrapezoidInterpolator<C> {
    fn goal(&self) -> KineticState {
        self.profile.goal
    }

    fn set_goal(&mut self, goal: KineticState) {
        self.profile.goal = goal;
    }

    #[inline]
    fn current_reference(&mut self) -> KineticState {
        let now = self.clock.now();
        let start = *self.start.get_or_insert(now);
        let elapsed = self.clock.duration_between(start, now) / NANOS_PER_SECOND;
        self.profile.sample(elapsed)
    }

    fn reset(&mut self) {
        self.start = None;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
