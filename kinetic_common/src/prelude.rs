//! Prelude module for common re-exports.
//!
//! ```rust
//! use kinetic_common::prelude::*;
//! ```

use std::time::Duration;

// ─── State ──────────────────────────────────────────────────────────
pub use crate::state::KineticState;

// ─── Time ───────────────────────────────────────────────────────────
pub use crate::time::{Clock, ManualClock, MonotonicClock, Timestamp};

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

/// Nanoseconds per second, for converting clock durations.
pub const NANOS_PER_SECOND: f64 = 1e9;

/// Default control loop period (100 Hz).
pub const DEFAULT_LOOP_PERIOD: Duration = Duration::from_millis(10);
