//! The `Host` trait -- the adapter interface for the platform capability.
//!
//! The trait is object-safe so the bridge can hold an `Arc<dyn Host>`.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::types::{Dismissal, HostEnvironment, LiveHandle};

/// Platform service that renders live activity cards.
///
/// Payloads handed to the host have already been validated and
/// normalized against the kind's schema. Each async method resolves once
/// the host has accepted the request, not once the UI has refreshed.
#[async_trait]
pub trait Host: Send + Sync {
    /// Human-readable name for this host (e.g. `"simulated"`).
    fn name(&self) -> &str;

    /// Report platform, version and bridge availability.
    ///
    /// Must not have side effects. Errors are treated as "unsupported".
    fn probe(&self) -> Result<HostEnvironment>;

    /// Materialize a new presentation of `kind`.
    async fn request(&self, kind: &str, attributes: &Value, content: &Value)
    -> Result<LiveHandle>;

    /// Replace the presentation's content wholesale.
    async fn update(&self, handle: &LiveHandle, content: &Value) -> Result<()>;

    /// Tear the presentation down.
    async fn end(&self, handle: &LiveHandle, dismissal: Dismissal) -> Result<()>;
}

// Compile-time assertion: Host must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Host) {}
};
