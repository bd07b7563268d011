//! Typed registry and dispatch bridge for live, updatable on-screen
//! activity cards.
//!
//! ```text
//! caller
//!   |
//!   v
//! LiveActivities (facade) --validate, gate--> ActivityBridge
//!                                                 |
//!                        KindRegistry --parse-----+
//!                                                 |
//!                                                 v
//!                                            &dyn Host
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod facade;
pub mod host;
pub mod kind;
pub mod protocol;

pub use bridge::{ActivityBridge, LiveActivity};
pub use config::{CapabilityConfig, HostVersion};
pub use error::ActivityError;
pub use facade::{ActivityInfo, DismissalPolicy, LiveActivities};
pub use host::{Dismissal, Host, HostEnvironment, LiveHandle, SimulatedHost};
pub use kind::{ActivityKind, KindRegistry};
