//! Monotonic time capability.
//!
//! Time-dependent elements (PID integration, trapezoid profiles) never read
//! an ambient clock. They are handed a [`Clock`] at construction, which lets
//! production code use [`MonotonicClock`] while tests drive a
//! [`ManualClock`] tick by tick.
//!
//! Clocks must report non-decreasing timestamps with nanosecond resolution.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A point in time, in nanoseconds since the owning clock's origin.
///
/// Timestamps from different clock instances are not comparable unless the
/// clocks were cloned from one another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Timestamp at the clock origin.
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from raw nanoseconds.
    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Raw nanoseconds since the clock origin.
    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Signed nanoseconds from `earlier` to `self`.
    #[inline]
    pub fn nanos_since(self, earlier: Self) -> f64 {
        (i128::from(self.0) - i128::from(earlier.0)) as f64
    }
}

/// Monotonic time source.
pub trait Clock {
    /// Current time.
    fn now(&self) -> Timestamp;

    /// Signed nanoseconds elapsed from `earlier` to `later`.
    #[inline]
    fn duration_between(&self, earlier: Timestamp, later: Timestamp) -> f64 {
        later.nanos_since(earlier)
    }
}

/// Wall-clock monotonic time backed by [`std::time::Instant`].
///
/// The origin is captured at construction; clones share it.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Timestamp {
        let nanos = self.origin.elapsed().as_nanos();
        Timestamp(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Deterministic clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the element under test. Not `Send`: the control loop is
/// single-threaded.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Rc<Cell<u64>>,
}

impl ManualClock {
    /// Create a clock standing at [`Timestamp::ZERO`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock standing at `nanos`.
    pub fn starting_at(nanos: u64) -> Self {
        Self {
            nanos: Rc::new(Cell::new(nanos)),
        }
    }

    /// Jump to an absolute time. Moving backwards is the caller's problem.
    pub fn set_nanos(&self, nanos: u64) {
        self.nanos.set(nanos);
    }

    /// Advance by `nanos` nanoseconds.
    pub fn advance_nanos(&self, nanos: u64) {
        self.nanos.set(self.nanos.get().saturating_add(nanos));
    }

    /// Advance by a [`Duration`].
    pub fn advance(&self, by: Duration) {
        self.advance_nanos(u64::try_from(by.as_nanos()).unwrap_or(u64::MAX));
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Timestamp {
        Timestamp(self.nanos.get())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
