//! Kinetic Common Library
//!
//! Shared building blocks for the kinetic workspace: the kinematic state
//! triple every control element speaks, the injectable monotonic clock, and
//! the TOML configuration loader used by applications.
//!
//! # Module Structure
//!
//! - [`state`] - [`KineticState`](state::KineticState) value type and arithmetic
//! - [`time`] - Clock capability with a real and a deterministic implementation
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use kinetic_common::prelude::*;
//!
//! let goal = KineticState::new(10.0, 0.0, 0.0);
//! let measured = KineticState::from_position(7.5);
//! assert_eq!((goal - measured).position, 2.5);
//! ```

pub mod config;
pub mod prelude;
pub mod state;
pub mod time;
