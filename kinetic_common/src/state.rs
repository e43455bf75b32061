//! Kinematic state triple.
//!
//! [`KineticState`] is the single currency of the control loop: measurements,
//! goals, references and errors are all expressed as a position, velocity and
//! acceleration. Arithmetic is component-wise and total; NaN and infinity
//! propagate untouched.

use core::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

/// Position, velocity and acceleration of a one-dimensional system.
///
/// Units are whatever the caller measures in; the control elements only
/// require that the three channels are consistent with each other.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(C)]
pub struct KineticState {
    /// Position.
    #[serde(default)]
    pub position: f64,
    /// First derivative of position.
    #[serde(default)]
    pub velocity: f64,
    /// Second derivative of position.
    #[serde(default)]
    pub acceleration: f64,
}

const_assert_eq!(core::mem::size_of::<KineticState>(), 24);

impl KineticState {
    /// The all-zero state.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a state from all three channels.
    #[inline]
    pub const fn new(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Create a state with only a position; velocity and acceleration are zero.
    #[inline]
    pub const fn from_position(position: f64) -> Self {
        Self::new(position, 0.0, 0.0)
    }

    /// Copy of this state with the position channel replaced.
    #[inline]
    #[must_use]
    pub const fn with_position(self, position: f64) -> Self {
        Self { position, ..self }
    }

    /// Component-wise absolute value.
    #[inline]
    #[must_use]
    pub fn abs(self) -> Self {
        Self::new(
            self.position.abs(),
            self.velocity.abs(),
            self.acceleration.abs(),
        )
    }

    /// Returns true if all channels are finite (not NaN, not Inf).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }
}

impl Add for KineticState {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.position + rhs.position,
            self.velocity + rhs.velocity,
            self.acceleration + rhs.acceleration,
        )
    }
}

impl Sub for KineticState {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.position - rhs.position,
            self.velocity - rhs.velocity,
            self.acceleration - rhs.acceleration,
        )
    }
}

impl Mul<f64> for KineticState {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Self::new(
            self.position * scalar,
            self.velocity * scalar,
            self.acceleration * scalar,
        )
    }
}

impl Neg for KineticState {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self * -1.0
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
