//! Shared test utilities for livecard integration tests.
//!
//! Provides payload builders for the built-in kinds, facade constructors
//! over a [`SimulatedHost`], and hosts with scripted failures.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde_json::{Value, json};

use livecard_core::{
    CapabilityConfig, Dismissal, Host, HostEnvironment, HostVersion, LiveActivities, LiveHandle,
    SimulatedHost,
};

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

pub fn counter_attributes(title: &str) -> Value {
    json!({ "title": title })
}

pub fn counter_content(value: i64) -> Value {
    json!({ "value": value })
}

pub fn status_attributes(identifier: &str, title: &str) -> Value {
    json!({ "identifier": identifier, "title": title })
}

pub fn status_content(status: &str) -> Value {
    json!({ "status": status })
}

pub fn progress_attributes(title: &str, total: i64) -> Value {
    json!({ "title": title, "total": total })
}

pub fn progress_content(current: i64) -> Value {
    json!({ "current": current })
}

// ---------------------------------------------------------------------------
// Facades
// ---------------------------------------------------------------------------

/// Facade over `host` with the default capability config.
pub fn facade_with(host: impl Host + 'static) -> LiveActivities {
    LiveActivities::new(Arc::new(host), CapabilityConfig::default())
}

/// Supported facade plus a handle onto its simulated host.
pub fn simulated_facade() -> (LiveActivities, SimulatedHost) {
    facade_on_version("17.0")
}

/// Facade over an `ios` simulated host at `version` (e.g. `"16.1"`).
pub fn facade_on_version(version: &str) -> (LiveActivities, SimulatedHost) {
    let version: HostVersion = version
        .parse()
        .unwrap_or_else(|e| panic!("bad test version {version:?}: {e}"));
    let host = SimulatedHost::with_version("ios", version);
    (facade_with(host.clone()), host)
}

// ---------------------------------------------------------------------------
// Scripted hosts
// ---------------------------------------------------------------------------

/// How [`BrokenProbeHost::probe`] misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    Error,
    Panic,
}

/// Host whose probe never succeeds. Every other call fails too.
#[derive(Debug, Clone, Copy)]
pub struct BrokenProbeHost(pub ProbeFailure);

#[async_trait]
impl Host for BrokenProbeHost {
    fn name(&self) -> &str {
        "broken-probe"
    }

    fn probe(&self) -> Result<HostEnvironment> {
        match self.0 {
            ProbeFailure::Error => Err(anyhow!("native module not linked")),
            ProbeFailure::Panic => panic!("probe exploded"),
        }
    }

    async fn request(&self, _kind: &str, _attributes: &Value, _content: &Value) -> Result<LiveHandle> {
        bail!("unreachable host")
    }

    async fn update(&self, _handle: &LiveHandle, _content: &Value) -> Result<()> {
        bail!("unreachable host")
    }

    async fn end(&self, _handle: &LiveHandle, _dismissal: Dismissal) -> Result<()> {
        bail!("unreachable host")
    }
}

/// Simulated host that rejects selected `end` calls, counted from zero in
/// the order they arrive.
#[derive(Debug, Clone)]
pub struct FlakyEndHost {
    inner: SimulatedHost,
    fail_on: Arc<HashSet<usize>>,
    ends: Arc<AtomicUsize>,
}

impl FlakyEndHost {
    pub fn new(inner: SimulatedHost, fail_on: impl IntoIterator<Item = usize>) -> Self {
        Self {
            inner,
            fail_on: Arc::new(fail_on.into_iter().collect()),
            ends: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `end` calls received so far.
    pub fn end_calls(&self) -> usize {
        self.ends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for FlakyEndHost {
    fn name(&self) -> &str {
        "flaky-end"
    }

    fn probe(&self) -> Result<HostEnvironment> {
        self.inner.probe()
    }

    async fn request(&self, kind: &str, attributes: &Value, content: &Value) -> Result<LiveHandle> {
        self.inner.request(kind, attributes, content).await
    }

    async fn update(&self, handle: &LiveHandle, content: &Value) -> Result<()> {
        self.inner.update(handle, content).await
    }

    async fn end(&self, handle: &LiveHandle, dismissal: Dismissal) -> Result<()> {
        let n = self.ends.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&n) {
            bail!("teardown {n} refused for {handle}");
        }
        self.inner.end(handle, dismissal).await
    }
}
