//! Values exchanged with a [`super::Host`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::HostVersion;

/// What the host reports about itself when probed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEnvironment {
    /// Operating system name, e.g. `"ios"`.
    pub platform: String,
    pub version: HostVersion,
    /// Whether the native bridge module could be loaded.
    pub bridge_loaded: bool,
}

impl HostEnvironment {
    pub fn new(platform: impl Into<String>, version: HostVersion) -> Self {
        Self {
            platform: platform.into(),
            version,
            bridge_loaded: true,
        }
    }
}

/// Opaque reference to a presentation owned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiveHandle(String);

impl LiveHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LiveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dismissal directive after version gating has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "policy", content = "until", rename_all = "lowercase")]
pub enum Dismissal {
    /// Remove the presentation right away.
    Immediate,
    /// Let the host pick the timing.
    Default,
    /// Keep the presentation visible until the given instant.
    After(DateTime<Utc>),
}
