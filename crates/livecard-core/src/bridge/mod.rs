//! Dispatch bridge: owns the kind registry, the host and the live-instance
//! table, and routes create/update/end to the right schema and handle.

pub mod table;

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ActivityError;
use crate::host::{Dismissal, Host};
use crate::kind::{ActivityKind, KindDescriptor, KindRegistry};

pub use table::{ActivityTable, LiveActivity};

/// Routes lifecycle requests to the host, keyed by activity id.
pub struct ActivityBridge {
    kinds: KindRegistry,
    host: Arc<dyn Host>,
    table: Mutex<ActivityTable>,
}

impl std::fmt::Debug for ActivityBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityBridge")
            .field("kinds", &self.kinds.names())
            .field("host", &self.host.name())
            .finish_non_exhaustive()
    }
}

impl ActivityBridge {
    /// Bridge over `host` with the built-in kinds registered.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_kinds(host, KindRegistry::builtin())
    }

    pub fn with_kinds(host: Arc<dyn Host>, kinds: KindRegistry) -> Self {
        Self {
            kinds,
            host,
            table: Mutex::new(ActivityTable::new()),
        }
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    /// Register an additional kind. See [`KindRegistry::register`].
    pub fn register_kind<K: ActivityKind>(&mut self) -> Option<KindDescriptor> {
        self.kinds.register::<K>()
    }

    /// Validate the payloads, ask the host for a presentation and record it.
    ///
    /// Nothing is recorded unless the host accepts the request.
    pub async fn create(
        &self,
        kind: &str,
        attributes: &Value,
        content: &Value,
    ) -> Result<LiveActivity, ActivityError> {
        let descriptor = self
            .kinds
            .get(kind)
            .ok_or_else(|| ActivityError::UnknownKind(kind.to_string()))?;

        let attributes = descriptor.parse_attributes(attributes).map_err(|source| {
            ActivityError::InvalidAttributes {
                kind: descriptor.name.to_string(),
                source,
            }
        })?;
        let content = descriptor
            .parse_content(content)
            .map_err(|source| ActivityError::InvalidContent {
                kind: descriptor.name.to_string(),
                source,
            })?;

        let handle = self
            .host
            .request(descriptor.name, &attributes, &content)
            .await
            .map_err(|e| {
                warn!(kind = descriptor.name, error = %e, "host rejected start request");
                ActivityError::host("start", &e)
            })?;

        let mut table = self.table.lock().await;
        let mut id = Uuid::new_v4().to_string();
        while table.contains(&id) {
            id = Uuid::new_v4().to_string();
        }
        let activity = LiveActivity {
            id,
            kind: descriptor.name,
            descriptor: *descriptor,
            handle,
            started_at: Utc::now(),
        };
        table.insert(activity.clone());
        info!(activity_id = %activity.id, kind = activity.kind, handle = %activity.handle, "activity started");
        Ok(activity)
    }

    /// Replace the content of a live activity.
    pub async fn update(&self, id: &str, content: &Value) -> Result<(), ActivityError> {
        let activity = self.lookup(id).await?;
        let descriptor = activity.descriptor;
        let content = descriptor
            .parse_content(content)
            .map_err(|source| ActivityError::InvalidContent {
                kind: descriptor.name.to_string(),
                source,
            })?;

        debug!(activity_id = id, kind = activity.kind, "dispatching content update");
        self.host
            .update(&activity.handle, &content)
            .await
            .map_err(|e| {
                warn!(activity_id = id, error = %e, "host rejected update request");
                ActivityError::host("update", &e)
            })
    }

    /// Forget the activity and ask the host to tear it down.
    ///
    /// The id is removed before the host is called and stays removed even
    /// if the teardown fails.
    pub async fn end(&self, id: &str, dismissal: Dismissal) -> Result<(), ActivityError> {
        let activity = self
            .table
            .lock()
            .await
            .remove(id)
            .ok_or_else(|| ActivityError::NotFound(id.to_string()))?;

        info!(activity_id = id, kind = activity.kind, ?dismissal, "activity ended");
        self.host
            .end(&activity.handle, dismissal)
            .await
            .map_err(|e| {
                warn!(activity_id = id, error = %e, "host rejected end request");
                ActivityError::host("end", &e)
            })
    }

    /// Ids of every live activity, oldest first.
    pub async fn ids(&self) -> Vec<String> {
        self.table.lock().await.ids()
    }

    /// Snapshot of a live activity.
    pub async fn get(&self, id: &str) -> Option<LiveActivity> {
        self.table.lock().await.get(id).cloned()
    }

    async fn lookup(&self, id: &str) -> Result<LiveActivity, ActivityError> {
        self.get(id)
            .await
            .ok_or_else(|| ActivityError::NotFound(id.to_string()))
    }
}
