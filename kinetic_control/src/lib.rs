//! # Kinetic Control
//!
//! Composable feedback/feedforward control loops for robotics mechanisms.
//! A [`ControlSystem`] is assembled from four independently replaceable
//! elements and called once per tick at a fixed rate:
//!
//! 1. **Filter**: smooths each channel of the raw measurement
//! 2. **Interpolator**: turns the goal into this tick's reference
//! 3. **Feedback**: corrects the error `reference − filtered`
//! 4. **Feedforward**: predicts the power the reference needs
//!
//! ## Time
//!
//! Nothing reads an ambient clock. Time-dependent elements (PID/SquID
//! integration, trapezoid profiles) are handed a
//! [`Clock`](kinetic_common::time::Clock) at construction; tests drive a
//! [`ManualClock`](kinetic_common::time::ManualClock).
//!
//! ## Errors
//!
//! Parameters are validated once, at construction. The per-tick path is
//! infallible and never allocates; NaN and infinity propagate to the output.

pub mod builder;
pub mod config;
pub mod error;
pub mod feedback;
pub mod feedforward;
pub mod filter;
pub mod interpolator;
pub mod sim;
pub mod system;

pub use builder::ControlSystemBuilder;
pub use error::{ElementError, ElementResult};
pub use system::ControlSystem;
