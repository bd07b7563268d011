//! Host capability seam.
//!
//! The [`Host`] trait is the boundary to the platform service that
//! materializes, updates and tears down on-screen activity presentations.
//! [`SimulatedHost`] is an in-memory implementation used by the CLI and
//! tests.

pub mod simulated;
pub mod trait_def;
pub mod types;

pub use simulated::{Presentation, PresentationState, SimulatedHost};
pub use trait_def::Host;
pub use types::{Dismissal, HostEnvironment, LiveHandle};
