//! Sequential filter chain.
//!
//! Filters are applied strictly in insertion order: the output of filter `i`
//! is the input of filter `i + 1`. Storage is a fixed-capacity
//! [`heapless::Vec`] so applying the chain never touches the allocator.

use core::fmt;

use super::Filter;
use crate::error::{ElementError, ElementResult};

/// Maximum number of filters in one chain.
pub const MAX_CHAINED_FILTERS: usize = 8;

/// Several filters applied one after another.
pub struct ChainedFilter {
    filters: heapless::Vec<Box<dyn Filter>, MAX_CHAINED_FILTERS>,
}

impl ChainedFilter {
    /// Build a chain from filters in application order.
    ///
    /// # Errors
    ///
    /// - [`ElementError::EmptyFilterChain`] if `filters` is empty.
    /// - [`ElementError::FilterChainFull`] if more than
    ///   [`MAX_CHAINED_FILTERS`] are supplied.
    pub fn new<I>(filters: I) -> ElementResult<Self>
    where
        I: IntoIterator<Item = Box<dyn Filter>>,
    {
        let mut chain = Self {
            filters: heapless::Vec::new(),
        };
        for filter in filters {
            chain.push(filter)?;
        }
        if chain.filters.is_empty() {
            return Err(ElementError::EmptyFilterChain);
        }
        Ok(chain)
    }

    /// Append a filter to the end of the chain.
    ///
    /// # Errors
    ///
    /// [`ElementError::FilterChainFull`] when the chain is at capacity.
    pub fn push(&mut self, filter: Box<dyn Filter>) -> ElementResult<()> {
        self.filters
            .push(filter)
            .map_err(|_| ElementError::FilterChainFull {
                capacity: MAX_CHAINED_FILTERS,
            })
    }

    /// Number of filters in the chain.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Always false for a successfully constructed chain.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for ChainedFilter {
    #[inline]
    fn filter(&mut self, measurement: f64) -> f64 {
        self.filters
            .iter_mut()
            .fold(measurement, |acc, filter| filter.filter(acc))
    }

    fn reset(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.reset();
        }
    }
}

impl fmt::Debug for ChainedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainedFilter")
            .field("len", &self.filters.len())
            .finish()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
