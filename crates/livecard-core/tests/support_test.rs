//! Supportability probing and gating.

use livecard_core::{ActivityError, DismissalPolicy, HostEnvironment, HostVersion, SimulatedHost};
use livecard_test_utils::{
    BrokenProbeHost, ProbeFailure, counter_attributes, counter_content, facade_on_version,
    facade_with,
};

#[test]
fn probe_error_means_unsupported() {
    let facade = facade_with(BrokenProbeHost(ProbeFailure::Error));
    assert!(!facade.is_supported());
    assert!(facade.environment().is_none());
}

#[test]
fn probe_panic_means_unsupported() {
    let facade = facade_with(BrokenProbeHost(ProbeFailure::Panic));
    assert!(!facade.is_supported());
}

#[test]
fn minimum_version_boundary() {
    assert!(!facade_on_version("16.0").0.is_supported());
    assert!(facade_on_version("16.1").0.is_supported());
    assert!(facade_on_version("18.3.1").0.is_supported());
}

#[test]
fn unloaded_bridge_is_unsupported() {
    let mut env = HostEnvironment::new("ios", HostVersion::new(17, 0));
    env.bridge_loaded = false;
    let facade = facade_with(SimulatedHost::new(env));
    assert!(!facade.is_supported());
}

#[tokio::test]
async fn broken_probe_never_raises_from_read_operations() {
    let facade = facade_with(BrokenProbeHost(ProbeFailure::Error));
    assert!(facade.get_all_activities().await.is_empty());
    facade
        .end_all_activities(DismissalPolicy::Immediate)
        .await
        .unwrap();

    let err = facade
        .start_activity("Counter", &counter_attributes("T"), &counter_content(1))
        .await
        .unwrap_err();
    assert_eq!(err, ActivityError::Unsupported);
    assert_eq!(err.to_string(), "live activities are not supported on this host");
}
