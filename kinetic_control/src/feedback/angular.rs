//! Wrap-around position error for rotary mechanisms.

use kinetic_common::state::KineticState;
use serde::{Deserialize, Serialize};

use super::FeedbackElement;

/// Unit in which an angular position is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleType {
    /// Half revolution is π.
    #[default]
    Radians,
    /// Half revolution is 180.
    Degrees,
    /// Half revolution is 0.5.
    Revolutions,
}

impl AngleType {
    /// Size of half a revolution in this unit.
    pub const fn half_revolution(self) -> f64 {
        match self {
            Self::Radians => core::f64::consts::PI,
            Self::Degrees => 180.0,
            Self::Revolutions => 0.5,
        }
    }

    /// Map `angle` into `(-h, h]` where `h` is a half revolution.
    ///
    /// Non-finite input is returned unchanged (as NaN for infinities).
    pub fn normalize(self, angle: f64) -> f64 {
        let half = self.half_revolution();
        let full = 2.0 * half;
        let wrapped = (angle + half).rem_euclid(full) - half;
        if wrapped <= -half { wrapped + full } else { wrapped }
    }
}

/// Feedback decorator that takes the short way around the circle.
///
/// The position error is normalized before delegating, so an error of 359°
/// becomes -1°. Velocity and acceleration errors pass through untouched.
#[derive(Debug, Clone)]
pub struct AngularFeedback<F> {
    angle_type: AngleType,
    inner: F,
}

impl<F: FeedbackElement> AngularFeedback<F> {
    /// Wrap `inner`, normalizing position error in `angle_type` units.
    pub const fn new(angle_type: AngleType, inner: F) -> Self {
        Self { angle_type, inner }
    }

    /// Angle unit in use.
    pub const fn angle_type(&self) -> AngleType {
        self.angle_type
    }

    /// Wrapped element.
    pub const fn inner(&self) -> &F {
        &self.inner
    }

    /// Wrapped element, mutably (e.g. to retune gains).
    pub const fn inner_mut(&mut self) -> &mut F {
        &mut self.inner
    }
}

impl<F: FeedbackElement> FeedbackElement for AngularFeedback<F> {
    #[inline]
    fn calculate(&mut self, error: KineticState) -> f64 {
        let wrapped = error.with_position(self.angle_type.normalize(error.position));
        self.inner.calculate(wrapped)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
