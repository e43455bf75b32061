//! Per-channel filtering of a [`KineticState`].

use core::fmt;

use kinetic_common::state::KineticState;

use super::{Filter, PassThroughFilter};

/// Applies an independent [`Filter`] to each channel of a measurement.
///
/// Channels left unconfigured pass through unchanged.
pub struct FilterElement {
    position: Box<dyn Filter>,
    velocity: Box<dyn Filter>,
    acceleration: Box<dyn Filter>,
}

impl FilterElement {
    /// Create an element from one filter per channel.
    pub fn new(
        position: Box<dyn Filter>,
        velocity: Box<dyn Filter>,
        acceleration: Box<dyn Filter>,
    ) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }

    /// Element that leaves every channel untouched.
    pub fn pass_through() -> Self {
        Self::new(
            Box::new(PassThroughFilter),
            Box::new(PassThroughFilter),
            Box::new(PassThroughFilter),
        )
    }

    /// Element that filters only the position channel.
    pub fn position_only(position: Box<dyn Filter>) -> Self {
        Self {
            position,
            ..Self::pass_through()
        }
    }

    /// Filter all three channels of `measurement`.
    #[inline]
    pub fn filter(&mut self, measurement: KineticState) -> KineticState {
        KineticState::new(
            self.position.filter(measurement.position),
            self.velocity.filter(measurement.velocity),
            self.acceleration.filter(measurement.acceleration),
        )
    }

    /// Reset every channel filter.
    pub fn reset(&mut self) {
        self.position.reset();
        self.velocity.reset();
        self.acceleration.reset();
    }
}

impl Default for FilterElement {
    fn default() -> Self {
        Self::pass_through()
    }
}

impl fmt::Debug for FilterElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterElement").finish_non_exhaustive()
    }
}
