//! Measurement filters.
//!
//! A [`Filter`] maps one raw sensor scalar to one filtered scalar and may keep
//! memory between calls. Filters compose in a [`ChainedFilter`], and a
//! [`FilterElement`] applies one filter per [`KineticState`] channel.
//!
//! Any `FnMut(f64) -> f64` closure is a (memory-less from the loop's point of
//! view) filter.
//!
//! [`KineticState`]: kinetic_common::state::KineticState

pub mod chain;
pub mod element;
pub mod low_pass;

pub use chain::{ChainedFilter, MAX_CHAINED_FILTERS};
pub use element::FilterElement;
pub use low_pass::{LowPassFilter, LowPassParameters};

/// A filter applied to a single sensor channel.
pub trait Filter {
    /// Filter one measurement, updating internal memory.
    fn filter(&mut self, measurement: f64) -> f64;

    /// Return to the freshly constructed state.
    fn reset(&mut self) {}
}

impl<F: FnMut(f64) -> f64> Filter for F {
    #[inline]
    fn filter(&mut self, measurement: f64) -> f64 {
        self(measurement)
    }
}

/// Identity filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughFilter;

impl Filter for PassThroughFilter {
    #[inline]
    fn filter(&mut self, measurement: f64) -> f64 {
        measurement
    }
}
