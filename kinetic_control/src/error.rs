//! Configuration errors raised while constructing control elements.
//!
//! Every element validates its parameters once, at construction, and fails
//! fast. Nothing here is raised from the per-tick path: once built, filters,
//! interpolators and controllers are total functions of their inputs.

use thiserror::Error;

/// Errors that can occur while constructing a control element.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElementError {
    /// Smoothing gain outside the closed unit interval.
    #[error("{element} gain must be between 0 and 1, but was {alpha}")]
    GainOutOfRange {
        /// Element that rejected the gain.
        element: &'static str,
        /// Offending gain.
        alpha: f64,
    },

    /// A filter chain was built with no filters in it.
    #[error("filter chain must contain at least one filter")]
    EmptyFilterChain,

    /// A filter chain was asked to hold more filters than it has room for.
    #[error("filter chain holds at most {capacity} filters")]
    FilterChainFull {
        /// Maximum number of chained filters.
        capacity: usize,
    },

    /// Trapezoid limits that are zero, NaN, or disagree in sign.
    #[error(
        "trapezoid limits must be non-zero and share one sign \
         (max_vel={max_vel}, accel={accel}, decel={decel})"
    )]
    InvalidProfile {
        /// Maximum cruise velocity.
        max_vel: f64,
        /// Acceleration-phase rate.
        accel: f64,
        /// Deceleration-phase rate.
        decel: f64,
    },
}

/// Result type for element construction.
pub type ElementResult<T> = Result<T, ElementError>;

/// Validate a smoothing gain in `[0, 1]`.
pub(crate) fn check_unit_gain(element: &'static str, alpha: f64) -> ElementResult<f64> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(ElementError::GainOutOfRange { element, alpha })
    }
}
