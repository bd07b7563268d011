//! Public facade: validate caller intent, gate on host support, delegate
//! to the [`ActivityBridge`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::bridge::{ActivityBridge, LiveActivity};
use crate::config::{CapabilityConfig, HostVersion};
use crate::error::ActivityError;
use crate::host::{Dismissal, Host, HostEnvironment};
use crate::kind::{ActivityKind, KindDescriptor, KindRegistry, schema};

/// Caller-facing dismissal policy for ending an activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DismissalPolicy {
    /// Remove the card right away.
    Immediate,
    /// Keep the card visible for the configured grace window. Hosts older
    /// than [`CapabilityConfig::after_dismissal_min_version`] get `Default`.
    After,
    #[default]
    Default,
}

impl DismissalPolicy {
    /// Resolve into the host-level directive for a host at `version`.
    pub fn resolve(
        self,
        config: &CapabilityConfig,
        version: HostVersion,
        now: DateTime<Utc>,
    ) -> Dismissal {
        match self {
            Self::Immediate => Dismissal::Immediate,
            Self::Default => Dismissal::Default,
            Self::After if config.supports_after_dismissal(version) => {
                let grace = i64::try_from(config.after_grace_secs).unwrap_or(i64::MAX);
                let until = Duration::try_seconds(grace)
                    .and_then(|d| now.checked_add_signed(d))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                Dismissal::After(until)
            }
            Self::After => {
                warn!(
                    %version,
                    required = %config.after_dismissal_min_version,
                    "\"after\" dismissal not available on this host, using default"
                );
                Dismissal::Default
            }
        }
    }
}

impl FromStr for DismissalPolicy {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "immediate" => Ok(Self::Immediate),
            "after" => Ok(Self::After),
            "default" => Ok(Self::Default),
            other => Err(ActivityError::InvalidArgument(format!(
                "unknown dismissal policy {other:?} (expected immediate, after, or default)"
            ))),
        }
    }
}

/// What a successful start returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInfo {
    pub activity_id: String,
    pub activity_type: String,
    /// Seconds since the Unix epoch.
    pub start_time: f64,
}

impl From<&LiveActivity> for ActivityInfo {
    fn from(activity: &LiveActivity) -> Self {
        Self {
            activity_id: activity.id.clone(),
            activity_type: activity.kind.to_string(),
            start_time: activity.started_at.timestamp_micros() as f64 / 1_000_000.0,
        }
    }
}

/// Entry point for every live-activity operation.
#[derive(Debug)]
pub struct LiveActivities {
    bridge: ActivityBridge,
    config: CapabilityConfig,
}

impl LiveActivities {
    /// Facade over `host` with the built-in kinds.
    pub fn new(host: Arc<dyn Host>, config: CapabilityConfig) -> Self {
        Self::with_bridge(ActivityBridge::new(host), config)
    }

    pub fn with_bridge(bridge: ActivityBridge, config: CapabilityConfig) -> Self {
        Self { bridge, config }
    }

    pub fn bridge(&self) -> &ActivityBridge {
        &self.bridge
    }

    pub fn config(&self) -> &CapabilityConfig {
        &self.config
    }

    pub fn kinds(&self) -> &KindRegistry {
        self.bridge.kinds()
    }

    /// Register an additional kind alongside the built-ins.
    pub fn register_kind<K: ActivityKind>(&mut self) -> Option<KindDescriptor> {
        self.bridge.register_kind::<K>()
    }

    /// Probe the host. Errors and panics in the probe read as `None`.
    pub fn environment(&self) -> Option<HostEnvironment> {
        let host = self.bridge.host();
        match catch_unwind(AssertUnwindSafe(|| host.probe())) {
            Ok(Ok(env)) => Some(env),
            Ok(Err(e)) => {
                debug!(host = host.name(), error = %e, "host probe failed");
                None
            }
            Err(_) => {
                warn!(host = host.name(), "host probe panicked");
                None
            }
        }
    }

    /// True only on the right platform, at or above the minimum version,
    /// with the bridge loaded. Never fails.
    pub fn is_supported(&self) -> bool {
        self.supported_environment().is_some()
    }

    fn supported_environment(&self) -> Option<HostEnvironment> {
        self.environment().filter(|env| {
            env.bridge_loaded
                && env.platform.eq_ignore_ascii_case(&self.config.platform)
                && env.version >= self.config.min_version
        })
    }

    fn gate(&self) -> Result<HostEnvironment, ActivityError> {
        self.supported_environment()
            .ok_or(ActivityError::Unsupported)
    }

    /// Start an activity of `kind` from untyped payloads.
    pub async fn start_activity(
        &self,
        kind: &str,
        attributes: &Value,
        content: &Value,
    ) -> Result<ActivityInfo, ActivityError> {
        self.gate()?;
        non_empty("activity type", kind)?;
        let activity = self.bridge.create(kind, attributes, content).await?;
        Ok(ActivityInfo::from(&activity))
    }

    /// Start an activity of kind `K` from typed records.
    pub async fn start<K: ActivityKind>(
        &self,
        attributes: &K::Attributes,
        content: &K::Content,
    ) -> Result<ActivityInfo, ActivityError> {
        let attributes = schema::encode(attributes).map_err(|source| {
            ActivityError::InvalidAttributes {
                kind: K::NAME.to_string(),
                source,
            }
        })?;
        let content = encode_content::<K>(content)?;
        self.start_activity(K::NAME, &attributes, &content).await
    }

    /// Replace the content of a live activity.
    ///
    /// Resolves once the host accepted the request; the card may refresh
    /// later.
    pub async fn update_activity(&self, id: &str, content: &Value) -> Result<(), ActivityError> {
        self.gate()?;
        non_empty("activity id", id)?;
        self.bridge.update(id, content).await
    }

    /// Typed update; fails if the activity is not of kind `K`.
    pub async fn update<K: ActivityKind>(
        &self,
        id: &str,
        content: &K::Content,
    ) -> Result<(), ActivityError> {
        self.gate()?;
        non_empty("activity id", id)?;
        let activity = self
            .bridge
            .get(id)
            .await
            .ok_or_else(|| ActivityError::NotFound(id.to_string()))?;
        if activity.kind != K::NAME {
            return Err(ActivityError::InvalidArgument(format!(
                "activity {id} is a {}, not a {}",
                activity.kind,
                K::NAME
            )));
        }
        let content = encode_content::<K>(content)?;
        self.bridge.update(id, &content).await
    }

    /// End a live activity with the given dismissal policy.
    pub async fn end_activity(
        &self,
        id: &str,
        policy: DismissalPolicy,
    ) -> Result<(), ActivityError> {
        let env = self.gate()?;
        non_empty("activity id", id)?;
        let dismissal = policy.resolve(&self.config, env.version, Utc::now());
        self.bridge.end(id, dismissal).await
    }

    /// Ids of every live activity; empty when unsupported.
    pub async fn get_all_activities(&self) -> Vec<String> {
        if !self.is_supported() {
            return Vec::new();
        }
        self.bridge.ids().await
    }

    /// Details of one live activity.
    pub async fn activity(&self, id: &str) -> Result<ActivityInfo, ActivityError> {
        self.gate()?;
        non_empty("activity id", id)?;
        self.bridge
            .get(id)
            .await
            .map(|a| ActivityInfo::from(&a))
            .ok_or_else(|| ActivityError::NotFound(id.to_string()))
    }

    /// End every live activity concurrently. A no-op when unsupported.
    ///
    /// Every end runs to completion; the first failure is returned. Ids
    /// whose end failed on the host side are still removed.
    pub async fn end_all_activities(&self, policy: DismissalPolicy) -> Result<(), ActivityError> {
        let Some(env) = self.supported_environment() else {
            return Ok(());
        };
        let dismissal = policy.resolve(&self.config, env.version, Utc::now());
        let ids = self.bridge.ids().await;
        debug!(count = ids.len(), ?dismissal, "ending all activities");

        let results = join_all(ids.iter().map(|id| self.bridge.end(id, dismissal))).await;
        results.into_iter().collect()
    }
}

fn non_empty(what: &str, value: &str) -> Result<(), ActivityError> {
    if value.is_empty() {
        return Err(ActivityError::InvalidArgument(format!(
            "{what} must be a non-empty string"
        )));
    }
    Ok(())
}

fn encode_content<K: ActivityKind>(content: &K::Content) -> Result<Value, ActivityError> {
    schema::encode(content).map_err(|source| ActivityError::InvalidContent {
        kind: K::NAME.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimulatedHost;
    use crate::kind::{Counter, CounterAttributes, CounterContent, Status, StatusContent};
    use chrono::TimeZone;
    use serde_json::json;

    fn facade_on(version: HostVersion) -> (LiveActivities, SimulatedHost) {
        let host = SimulatedHost::with_version("ios", version);
        let facade = LiveActivities::new(Arc::new(host.clone()), CapabilityConfig::default());
        (facade, host)
    }

    fn facade() -> (LiveActivities, SimulatedHost) {
        facade_on(HostVersion::new(17, 0))
    }

    #[test]
    fn policy_parses_wire_names() {
        assert_eq!("after".parse::<DismissalPolicy>().unwrap(), DismissalPolicy::After);
        assert_eq!(DismissalPolicy::default(), DismissalPolicy::Default);
        let err = "later".parse::<DismissalPolicy>().unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn after_resolves_to_grace_deadline() {
        let cfg = CapabilityConfig::default();
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        let dismissal = DismissalPolicy::After.resolve(&cfg, HostVersion::new(16, 2), now);
        assert_eq!(
            dismissal,
            Dismissal::After(Utc.timestamp_opt(1_300, 0).unwrap())
        );
    }

    #[test]
    fn after_downgrades_on_old_hosts() {
        let cfg = CapabilityConfig::default();
        let now = Utc::now();
        assert_eq!(
            DismissalPolicy::After.resolve(&cfg, HostVersion::new(16, 1), now),
            Dismissal::Default
        );
        assert_eq!(
            DismissalPolicy::Immediate.resolve(&cfg, HostVersion::new(16, 1), now),
            Dismissal::Immediate
        );
    }

    #[test]
    fn support_requires_platform_version_and_bridge() {
        assert!(facade().0.is_supported());
        assert!(!facade_on(HostVersion::new(16, 0)).0.is_supported());

        let android = SimulatedHost::with_version("android", HostVersion::new(17, 0));
        let f = LiveActivities::new(Arc::new(android), CapabilityConfig::default());
        assert!(!f.is_supported());

        let mut env = HostEnvironment::new("iOS", HostVersion::new(17, 0));
        let f = LiveActivities::new(
            Arc::new(SimulatedHost::new(env.clone())),
            CapabilityConfig::default(),
        );
        assert!(f.is_supported());

        env.bridge_loaded = false;
        let f = LiveActivities::new(Arc::new(SimulatedHost::new(env)), CapabilityConfig::default());
        assert!(!f.is_supported());
    }

    #[tokio::test]
    async fn start_returns_info() {
        let (facade, _host) = facade();
        let before = Utc::now().timestamp() as f64;
        let info = facade
            .start_activity("Counter", &json!({"title": "T"}), &json!({"value": 10}))
            .await
            .unwrap();
        assert_eq!(info.activity_type, "Counter");
        assert!(!info.activity_id.is_empty());
        assert!(info.start_time >= before);
        assert_eq!(facade.activity(&info.activity_id).await.unwrap(), info);
    }

    #[tokio::test]
    async fn info_serializes_camel_case() {
        let info = ActivityInfo {
            activity_id: "a".to_string(),
            activity_type: "Counter".to_string(),
            start_time: 1.5,
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({"activityId": "a", "activityType": "Counter", "startTime": 1.5})
        );
    }

    #[tokio::test]
    async fn empty_kind_and_id_are_invalid_arguments() {
        let (facade, _host) = facade();
        let err = facade
            .start_activity("", &json!({}), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_argument");

        let err = facade.update_activity("", &json!({})).await.unwrap_err();
        assert_eq!(err.code(), "invalid_argument");

        let err = facade
            .end_activity("", DismissalPolicy::Default)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_argument");

        // Whitespace is a legal (if unknown) id.
        let err = facade
            .end_activity(" ", DismissalPolicy::Default)
            .await
            .unwrap_err();
        assert_eq!(err, ActivityError::NotFound(" ".to_string()));
    }

    #[tokio::test]
    async fn unsupported_host_gates_every_operation() {
        let (facade, host) = facade_on(HostVersion::new(15, 4));
        let err = facade
            .start_activity("Counter", &json!({"title": "T"}), &json!({"value": 1}))
            .await
            .unwrap_err();
        assert_eq!(err, ActivityError::Unsupported);
        assert_eq!(
            facade.update_activity("x", &json!({})).await.unwrap_err(),
            ActivityError::Unsupported
        );
        assert_eq!(
            facade
                .end_activity("x", DismissalPolicy::Immediate)
                .await
                .unwrap_err(),
            ActivityError::Unsupported
        );
        assert!(facade.get_all_activities().await.is_empty());
        facade
            .end_all_activities(DismissalPolicy::Default)
            .await
            .unwrap();
        assert_eq!(host.active_count().await, 0);
    }

    #[tokio::test]
    async fn typed_start_and_update() {
        let (facade, host) = facade();
        let info = facade
            .start::<Counter>(
                &CounterAttributes {
                    title: "Laps".to_string(),
                    color: Some("red".to_string()),
                },
                &CounterContent {
                    value: 1,
                    status: None,
                },
            )
            .await
            .unwrap();

        facade
            .update::<Counter>(
                &info.activity_id,
                &CounterContent {
                    value: 2,
                    status: Some("going".to_string()),
                },
            )
            .await
            .unwrap();

        let err = facade
            .update::<Status>(
                &info.activity_id,
                &StatusContent {
                    status: "x".to_string(),
                    progress: None,
                    details: None,
                    timestamp: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_argument");

        let live = facade.bridge().get(&info.activity_id).await.unwrap();
        let shown = host.presentation(&live.handle).await.unwrap();
        assert_eq!(shown.attributes, json!({"title": "Laps", "color": "red"}));
        assert_eq!(shown.content, json!({"value": 2, "status": "going"}));
    }

    #[tokio::test]
    async fn end_after_on_old_host_silently_uses_default() {
        let (facade, host) = facade_on(HostVersion::new(16, 1));
        let info = facade
            .start_activity("Counter", &json!({"title": "T"}), &json!({"value": 1}))
            .await
            .unwrap();
        let live = facade.bridge().get(&info.activity_id).await.unwrap();

        facade
            .end_activity(&info.activity_id, DismissalPolicy::After)
            .await
            .unwrap();
        let shown = host.presentation(&live.handle).await.unwrap();
        assert_eq!(
            shown.state,
            crate::host::PresentationState::Ended(Dismissal::Default)
        );
    }

    #[tokio::test]
    async fn end_all_clears_everything() {
        let (facade, host) = facade();
        for i in 0..3 {
            facade
                .start_activity("Counter", &json!({"title": "T"}), &json!({"value": i}))
                .await
                .unwrap();
        }
        assert_eq!(facade.get_all_activities().await.len(), 3);

        facade
            .end_all_activities(DismissalPolicy::Immediate)
            .await
            .unwrap();
        assert!(facade.get_all_activities().await.is_empty());
        assert_eq!(host.active_count().await, 0);
    }

    #[tokio::test]
    async fn end_all_reports_failure_but_still_removes_ids() {
        let (facade, host) = facade();
        facade
            .start_activity("Counter", &json!({"title": "T"}), &json!({"value": 1}))
            .await
            .unwrap();
        facade
            .start_activity("Counter", &json!({"title": "U"}), &json!({"value": 2}))
            .await
            .unwrap();

        host.set_rejecting(true);
        let err = facade
            .end_all_activities(DismissalPolicy::Default)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "host_operation_failed");
        assert!(facade.get_all_activities().await.is_empty());
    }
}
