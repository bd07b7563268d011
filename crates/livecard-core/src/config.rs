//! Capability gating configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A host OS version, compared by `(major, minor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostVersion {
    pub major: u32,
    pub minor: u32,
}

impl HostVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid host version {0:?} (expected MAJOR.MINOR)")]
pub struct VersionParseError(String);

impl FromStr for HostVersion {
    type Err = VersionParseError;

    /// Accepts `"17"`, `"16.2"` and `"16.2.1"`; a patch component is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(err)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| err())?,
            None => 0,
        };
        if let Some(patch) = parts.next() {
            patch.parse::<u32>().map_err(|_| err())?;
        }
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self { major, minor })
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for HostVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HostVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Version gates and policy knobs for the live-activity capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    /// Platform name the capability exists on.
    pub platform: String,
    /// Oldest host version exposing the capability at all.
    pub min_version: HostVersion,
    /// Oldest host version honoring the `after` dismissal policy.
    pub after_dismissal_min_version: HostVersion,
    /// How long an `after`-dismissed card stays visible.
    pub after_grace_secs: u64,
}

impl CapabilityConfig {
    pub const DEFAULT_PLATFORM: &str = "ios";
    pub const DEFAULT_MIN_VERSION: HostVersion = HostVersion::new(16, 1);
    pub const DEFAULT_AFTER_MIN_VERSION: HostVersion = HostVersion::new(16, 2);
    pub const DEFAULT_AFTER_GRACE_SECS: u64 = 300;

    /// Whether a host at `version` may use the `after` dismissal policy.
    pub fn supports_after_dismissal(&self, version: HostVersion) -> bool {
        version >= self.after_dismissal_min_version
    }
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            platform: Self::DEFAULT_PLATFORM.to_string(),
            min_version: Self::DEFAULT_MIN_VERSION,
            after_dismissal_min_version: Self::DEFAULT_AFTER_MIN_VERSION,
            after_grace_secs: Self::DEFAULT_AFTER_GRACE_SECS,
        }
    }
}
