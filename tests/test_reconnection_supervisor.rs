//! Behavioral tests for the reconnection supervisor
//!
//! Driven through the mock relay handle: state transitions, manual control
//! operations, restart serialization, and cluster status cleanup.

use broker_relay::cluster::{ClusterStatusMap, InMemoryStatusMap};
use broker_relay::relay::{
    resolve_address_csv, AvailabilityTracker, ConnectorFactory, ReconnectionSupervisor,
    RelayHandle, RelayMode,
};
use broker_relay::testing::mocks::MockRelayHandle;
use std::sync::Arc;
use std::time::Duration;

type Supervisor = Arc<ReconnectionSupervisor<MockRelayHandle>>;

fn external_setup(
    handle: Arc<MockRelayHandle>,
    csv: &str,
    retry_interval: Duration,
) -> (Supervisor, Arc<InMemoryStatusMap>) {
    let status_map = Arc::new(InMemoryStatusMap::new());
    let tracker = Arc::new(AvailabilityTracker::new("node-1", status_map.clone()));
    let connector =
        ConnectorFactory::create(resolve_address_csv(csv)).expect("valid address list");
    let supervisor = ReconnectionSupervisor::new(
        RelayMode::external(connector, handle),
        tracker,
        retry_interval,
    );
    (supervisor, status_map)
}

fn embedded_setup() -> (Supervisor, Arc<InMemoryStatusMap>) {
    let status_map = Arc::new(InMemoryStatusMap::new());
    let tracker = Arc::new(AvailabilityTracker::new("node-1", status_map.clone()));
    let supervisor =
        ReconnectionSupervisor::new(RelayMode::Embedded, tracker, Duration::from_secs(10));
    (supervisor, status_map)
}

#[tokio::test]
async fn test_manual_reconnect_attempts_immediately() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, _) =
        external_setup(handle.clone(), "a:61613,b:61613", Duration::from_secs(10));

    assert!(!supervisor.is_reconnecting());
    assert!(supervisor.trigger_manual_reconnect().await);

    // The first attempt ran before the call returned, no tick needed.
    assert!(supervisor.is_reconnecting());
    assert_eq!(handle.start_count(), 1);
    assert_eq!(handle.started_endpoints()[0].to_string(), "a:61613");

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_attempts_advance_round_robin() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, _) =
        external_setup(handle.clone(), "a:61613,b:61613", Duration::from_secs(10));

    supervisor.trigger_manual_connect().await;
    supervisor.trigger_manual_connect().await;
    supervisor.trigger_manual_connect().await;

    let attempted: Vec<String> = handle
        .started_endpoints()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(attempted, vec!["a:61613", "b:61613", "a:61613"]);
}

#[tokio::test]
async fn test_manual_operations_are_noops_in_embedded_mode() {
    let (supervisor, _) = embedded_setup();

    assert!(!supervisor.trigger_manual_reconnect().await);
    assert!(!supervisor.trigger_manual_connect().await);
    assert!(!supervisor.trigger_manual_disconnect().await);
    assert!(!supervisor.is_reconnecting());
    assert!(supervisor.is_relay_running());
}

#[tokio::test(start_paused = true)]
async fn test_availability_events_are_noops_in_embedded_mode() {
    let (supervisor, status_map) = embedded_setup();

    // No external relay to restart: no retry loop must be spawned.
    supervisor.on_availability_changed(false).await;
    assert!(!supervisor.is_reconnecting());
    assert_eq!(status_map.snapshot().get("node-1"), Some(&false));
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!supervisor.is_reconnecting());

    // Availability itself is still tracked and mirrored.
    supervisor.on_availability_changed(true).await;
    assert!(supervisor.tracker().is_available());
    assert_eq!(status_map.snapshot().get("node-1"), Some(&true));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_flapping_leaves_no_orphan_loop() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, _) = external_setup(handle.clone(), "a:61613", Duration::from_millis(20));

    // Down/up pairs racing each other; whichever interleaving wins, no loop
    // task may survive the final up.
    for _ in 0..20 {
        tokio::join!(
            supervisor.on_availability_changed(false),
            supervisor.on_availability_changed(true),
        );
    }
    supervisor.on_availability_changed(true).await;
    assert!(!supervisor.is_reconnecting());

    let settled = handle.start_count();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(handle.start_count(), settled, "orphan loop kept attempting");
}

#[tokio::test]
async fn test_manual_disconnect_is_idempotent() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, _) = external_setup(handle.clone(), "a:61613", Duration::from_secs(10));

    supervisor.trigger_manual_connect().await;
    assert!(handle.is_running());

    assert!(supervisor.trigger_manual_disconnect().await);
    assert!(!handle.is_running());
    assert!(!supervisor.tracker().is_available());
    let stops_after_first = handle.stop_count();

    // Second disconnect is safe: nothing to stop, availability re-marked.
    assert!(supervisor.trigger_manual_disconnect().await);
    assert_eq!(handle.stop_count(), stops_after_first);
    assert!(!handle.is_running());
}

#[tokio::test]
async fn test_concurrent_triggers_never_overlap_restart() {
    let handle = Arc::new(MockRelayHandle::with_call_delay(Duration::from_millis(25)));
    let (supervisor, _) =
        external_setup(handle.clone(), "a:61613,b:61613", Duration::from_secs(10));

    // Availability callback and manual trigger race for the same restart.
    tokio::join!(
        supervisor.on_availability_changed(false),
        supervisor.trigger_manual_connect(),
    );

    assert!(handle.max_in_flight() <= 1, "restart attempts overlapped");

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_concurrent_manual_connects_skip_collision() {
    let handle = Arc::new(MockRelayHandle::with_call_delay(Duration::from_millis(25)));
    let (supervisor, _) = external_setup(handle.clone(), "a:61613", Duration::from_secs(10));

    tokio::join!(
        supervisor.trigger_manual_connect(),
        supervisor.trigger_manual_connect(),
    );

    // The loser of the restart guard skips silently.
    assert_eq!(handle.start_count(), 1);
    assert_eq!(handle.max_in_flight(), 1);
}

#[tokio::test]
async fn test_availability_events_drive_state_machine() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, status_map) =
        external_setup(handle.clone(), "a:61613", Duration::from_secs(10));

    supervisor.on_availability_changed(false).await;
    assert!(supervisor.is_reconnecting());
    assert_eq!(status_map.snapshot().get("node-1"), Some(&false));
    assert!(handle.start_count() >= 1);

    supervisor.on_availability_changed(true).await;
    assert!(!supervisor.is_reconnecting());
    assert!(supervisor.tracker().is_available());
    assert_eq!(status_map.snapshot().get("node-1"), Some(&true));

    supervisor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_retry_loop_survives_failed_attempts() {
    let handle = Arc::new(MockRelayHandle::with_failure());
    let (supervisor, _) = external_setup(handle.clone(), "a:61613", Duration::from_millis(10));

    supervisor.on_availability_changed(false).await;
    tokio::time::sleep(Duration::from_millis(55)).await;

    // Immediate attempt plus scheduled ticks, all failing, none fatal.
    assert!(handle.start_count() >= 3);
    assert!(supervisor.is_reconnecting());
    assert!(!handle.is_running());

    // Broker comes back reachable; the next tick starts the relay.
    handle.set_should_fail(false);
    tokio::time::sleep(Duration::from_millis(25)).await;
    assert!(handle.is_running());

    supervisor.shutdown().await;
}

#[tokio::test]
async fn test_stopping_cancels_future_ticks() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, _) = external_setup(handle.clone(), "a:61613", Duration::from_millis(20));

    supervisor.on_availability_changed(false).await;
    supervisor.on_availability_changed(true).await;
    let count_when_stopped = handle.start_count();

    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(handle.start_count(), count_when_stopped);
}

#[tokio::test]
async fn test_shutdown_removes_cluster_entry() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, status_map) =
        external_setup(handle.clone(), "a:61613", Duration::from_secs(10));

    supervisor.on_availability_changed(false).await;
    assert!(status_map.snapshot().contains_key("node-1"));

    supervisor.shutdown().await;
    assert!(!supervisor.is_reconnecting());
    assert!(!status_map.snapshot().contains_key("node-1"));
}

#[tokio::test]
async fn test_reconnect_while_reconnecting_restarts_loop() {
    let handle = Arc::new(MockRelayHandle::new());
    let (supervisor, _) = external_setup(handle.clone(), "a:61613", Duration::from_secs(10));

    supervisor.on_availability_changed(false).await;
    assert!(supervisor.trigger_manual_reconnect().await);

    assert!(supervisor.is_reconnecting());
    // One attempt from the event, one forced by the manual reconnect.
    assert_eq!(handle.start_count(), 2);

    supervisor.shutdown().await;
}
