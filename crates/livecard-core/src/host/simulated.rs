//! In-memory host used by the CLI and by tests.
//!
//! Every presentation is kept (including ended ones) so callers can inspect
//! what the host was asked to do.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::trait_def::Host;
use super::types::{Dismissal, HostEnvironment, LiveHandle};
use crate::config::{CapabilityConfig, HostVersion};

/// Lifecycle of a simulated presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationState {
    Active,
    Ended(Dismissal),
}

/// Snapshot of what the host is showing for one handle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub kind: String,
    pub attributes: Value,
    pub content: Value,
    /// Number of content replacements since creation.
    pub updates: u32,
    pub state: PresentationState,
}

/// Host that keeps presentations in memory.
#[derive(Clone)]
pub struct SimulatedHost {
    environment: HostEnvironment,
    presentations: Arc<Mutex<HashMap<LiveHandle, Presentation>>>,
    next_handle: Arc<AtomicU64>,
    /// When set, every request/update/end is rejected.
    rejecting: Arc<AtomicBool>,
}

impl std::fmt::Debug for SimulatedHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedHost")
            .field("environment", &self.environment)
            .field("rejecting", &self.rejecting.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new(HostEnvironment::new(
            CapabilityConfig::DEFAULT_PLATFORM,
            HostVersion::new(17, 0),
        ))
    }
}

impl SimulatedHost {
    pub fn new(environment: HostEnvironment) -> Self {
        Self {
            environment,
            presentations: Arc::new(Mutex::new(HashMap::new())),
            next_handle: Arc::new(AtomicU64::new(1)),
            rejecting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulated host on `platform` at `version` with the bridge loaded.
    pub fn with_version(platform: &str, version: HostVersion) -> Self {
        Self::new(HostEnvironment::new(platform, version))
    }

    /// Start or stop rejecting every mutating request.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Current state of the presentation behind `handle`.
    pub async fn presentation(&self, handle: &LiveHandle) -> Option<Presentation> {
        self.presentations.lock().await.get(handle).cloned()
    }

    /// Number of presentations not yet ended.
    pub async fn active_count(&self) -> usize {
        self.presentations
            .lock()
            .await
            .values()
            .filter(|p| p.state == PresentationState::Active)
            .count()
    }

    fn ensure_accepting(&self, operation: &str) -> Result<()> {
        if self.rejecting.load(Ordering::SeqCst) {
            bail!("simulated host rejected {operation} request");
        }
        Ok(())
    }
}

#[async_trait]
impl Host for SimulatedHost {
    fn name(&self) -> &str {
        "simulated"
    }

    fn probe(&self) -> Result<HostEnvironment> {
        Ok(self.environment.clone())
    }

    async fn request(
        &self,
        kind: &str,
        attributes: &Value,
        content: &Value,
    ) -> Result<LiveHandle> {
        self.ensure_accepting("start")?;
        let handle = LiveHandle::new(format!(
            "sim-{}",
            self.next_handle.fetch_add(1, Ordering::Relaxed)
        ));
        debug!(%handle, kind, "simulated presentation created");
        self.presentations.lock().await.insert(
            handle.clone(),
            Presentation {
                kind: kind.to_string(),
                attributes: attributes.clone(),
                content: content.clone(),
                updates: 0,
                state: PresentationState::Active,
            },
        );
        Ok(handle)
    }

    async fn update(&self, handle: &LiveHandle, content: &Value) -> Result<()> {
        self.ensure_accepting("update")?;
        let mut presentations = self.presentations.lock().await;
        let Some(presentation) = presentations.get_mut(handle) else {
            bail!("no presentation for handle {handle}");
        };
        if presentation.state != PresentationState::Active {
            bail!("presentation {handle} has already ended");
        }
        presentation.content = content.clone();
        presentation.updates += 1;
        debug!(%handle, updates = presentation.updates, "simulated presentation updated");
        Ok(())
    }

    async fn end(&self, handle: &LiveHandle, dismissal: Dismissal) -> Result<()> {
        self.ensure_accepting("end")?;
        let mut presentations = self.presentations.lock().await;
        let Some(presentation) = presentations.get_mut(handle) else {
            bail!("no presentation for handle {handle}");
        };
        if presentation.state != PresentationState::Active {
            bail!("presentation {handle} has already ended");
        }
        presentation.state = PresentationState::Ended(dismissal);
        debug!(%handle, ?dismissal, "simulated presentation ended");
        Ok(())
    }
}
