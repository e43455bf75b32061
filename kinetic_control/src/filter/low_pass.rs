//! First-order exponential low-pass filter.
//!
//! ```text
//! y[n] = alpha · y[n-1] + (1 - alpha) · x[n]
//! ```
//!
//! High alpha is smoother with more phase lag; low alpha tracks the input
//! more closely. alpha = 0 passes the input through, alpha = 1 freezes the
//! output at the starting estimate.

use serde::{Deserialize, Serialize};

use super::Filter;
use crate::error::{ElementResult, check_unit_gain};

/// Low-pass filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowPassParameters {
    /// Weight of the previous estimate, in `[0, 1]`.
    pub alpha: f64,
    /// Estimate before the first sample. Should match the starting measurement.
    #[serde(default)]
    pub starting_estimate: f64,
}

impl LowPassParameters {
    /// Parameters with a zero starting estimate.
    pub const fn new(alpha: f64) -> Self {
        Self {
            alpha,
            starting_estimate: 0.0,
        }
    }
}

/// Exponential smoothing filter.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    parameters: LowPassParameters,
    previous_estimate: f64,
}

impl LowPassFilter {
    /// Create a filter.
    ///
    /// # Errors
    ///
    /// [`ElementError::GainOutOfRange`](crate::error::ElementError::GainOutOfRange)
    /// if `alpha` is outside `[0, 1]`.
    pub fn new(parameters: LowPassParameters) -> ElementResult<Self> {
        check_unit_gain("low pass", parameters.alpha)?;
        Ok(Self {
            parameters,
            previous_estimate: parameters.starting_estimate,
        })
    }

    /// Shorthand for [`LowPassFilter::new`] with explicit values.
    pub fn with_alpha(alpha: f64, starting_estimate: f64) -> ElementResult<Self> {
        Self::new(LowPassParameters {
            alpha,
            starting_estimate,
        })
    }

    /// Current parameters.
    pub const fn parameters(&self) -> LowPassParameters {
        self.parameters
    }

    /// Replace the smoothing gain without disturbing the current estimate.
    ///
    /// # Errors
    ///
    /// Rejects `alpha` outside `[0, 1]`; the filter is left unchanged.
    pub fn set_alpha(&mut self, alpha: f64) -> ElementResult<()> {
        self.parameters.alpha = check_unit_gain("low pass", alpha)?;
        Ok(())
    }

    /// Last output (or the starting estimate before the first sample).
    pub const fn estimate(&self) -> f64 {
        self.previous_estimate
    }
}

impl Filter for LowPassFilter {
    #[inline]
    fn filter(&mut self, measurement: f64) -> f64 {
        let alpha = self.parameters.alpha;
        let estimate = alpha * self.previous_estimate + (1.0 - alpha) * measurement;
        self.previous_estimate = estimate;
        estimate
    }

    fn reset(&mut self) {
        self.previous_estimate = self.parameters.starting_estimate;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
