//! Reconnection supervisor
//!
//! State machine with two states, Idle and Reconnecting, realized as an
//! atomic `loop_running` flag. The retry loop is a spawned tokio task that
//! performs one restart attempt per fixed-interval tick; a second atomic,
//! `restart_in_progress`, serializes single attempts so a scheduled tick and
//! a manual trigger never execute the stop/start sequence concurrently.
//!
//! Stopping the loop signals a watch channel, which cancels only the future
//! tick: an attempt already executing runs to completion so the relay handle
//! is never left half-stopped. No timeout wraps the attempt itself; bounding
//! is delegated to the transport's own connect/handshake timeouts.

use super::availability::AvailabilityTracker;
use super::failover::FailoverConnector;
use super::handle::{RelayError, RelayHandle, RelayMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fixed delay between scheduled reconnect attempts.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

struct LoopTask {
    shutdown_tx: watch::Sender<bool>,
    _handle: JoinHandle<()>,
}

/// Orchestrates reconnect attempts and exposes the manual control surface.
/// One instance per node owns the reconnection state exclusively.
pub struct ReconnectionSupervisor<H: RelayHandle> {
    mode: RelayMode<H>,
    tracker: Arc<AvailabilityTracker>,
    retry_interval: Duration,
    loop_running: AtomicBool,
    restart_in_progress: AtomicBool,
    loop_task: Mutex<Option<LoopTask>>,
}

impl<H: RelayHandle> ReconnectionSupervisor<H> {
    pub fn new(
        mode: RelayMode<H>,
        tracker: Arc<AvailabilityTracker>,
        retry_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            mode,
            tracker,
            retry_interval,
            loop_running: AtomicBool::new(false),
            restart_in_progress: AtomicBool::new(false),
            loop_task: Mutex::new(None),
        })
    }

    /// Single registration point for broker availability events. Delivery is
    /// serialized by the event source.
    pub async fn on_availability_changed(self: &Arc<Self>, available: bool) {
        self.tracker.set_available(available);
        if available {
            self.stop_loop().await;
        } else {
            self.start_loop().await;
        }
    }

    /// Whether the retry loop is active (state Reconnecting).
    pub fn is_reconnecting(&self) -> bool {
        self.loop_running.load(Ordering::Acquire)
    }

    /// Whether the relay is running. Embedded mode has no external relay and
    /// counts as trivially running.
    pub fn is_relay_running(&self) -> bool {
        match &self.mode {
            RelayMode::Embedded => true,
            RelayMode::External { handle, .. } => handle.is_running(),
        }
    }

    /// Configured broker addresses, in failover order.
    pub fn configured_addresses(&self) -> Vec<String> {
        match &self.mode {
            RelayMode::Embedded => Vec::new(),
            RelayMode::External { connector, .. } => connector
                .endpoints()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    pub fn tracker(&self) -> &Arc<AvailabilityTracker> {
        &self.tracker
    }

    /// Stop the retry loop, then restart it, forcing an immediate attempt.
    /// Returns `false` without side effects when no external relay is
    /// configured.
    pub async fn trigger_manual_reconnect(self: &Arc<Self>) -> bool {
        if self.mode.is_embedded() {
            return false;
        }
        info!("manual reconnect requested");
        self.stop_loop().await;
        self.start_loop().await;
        true
    }

    /// Stop the retry loop and the relay handle, and mark the broker
    /// unavailable. Idempotent: repeated calls are safe.
    pub async fn trigger_manual_disconnect(&self) -> bool {
        let RelayMode::External { handle, .. } = &self.mode else {
            return false;
        };
        info!("manual disconnect requested");
        self.stop_loop().await;
        if handle.is_running() {
            if let Err(e) = handle.stop().await {
                warn!(error = %e, "relay stop failed during manual disconnect");
            }
        }
        self.tracker.set_available(false);
        true
    }

    /// Stop the retry loop and perform exactly one restart attempt.
    /// Availability is marked false afterwards: a successful TCP connect does
    /// not itself guarantee broker-level availability, the next availability
    /// event does.
    pub async fn trigger_manual_connect(&self) -> bool {
        if self.mode.is_embedded() {
            return false;
        }
        info!("manual connect requested");
        self.stop_loop().await;
        self.restart_attempt().await;
        self.tracker.set_available(false);
        true
    }

    /// Stop the loop and remove this node's entry from the cluster map.
    pub async fn shutdown(&self) {
        self.stop_loop().await;
        self.tracker.shutdown();
    }

    /// Idle -> Reconnecting. The compare-and-set guarantees a single winner
    /// when the availability callback and a manual trigger race. A no-op in
    /// embedded mode: there is no external relay to restart.
    async fn start_loop(self: &Arc<Self>) {
        if self.mode.is_embedded() {
            return;
        }
        if self
            .loop_running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        info!(
            interval_secs = self.retry_interval.as_secs(),
            "starting broker reconnect loop"
        );

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let supervisor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(supervisor.retry_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately once; the caller runs that attempt.
            interval.tick().await;
            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            debug!("reconnect loop stopped");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if !supervisor.loop_running.load(Ordering::Acquire) {
                            break;
                        }
                        supervisor.restart_attempt().await;
                    }
                }
            }
        });

        {
            let mut task_slot = self.loop_task.lock().await;
            *task_slot = Some(LoopTask {
                shutdown_tx,
                _handle: handle,
            });
            // A stop racing in before the store found an empty slot and
            // signalled nothing; it flipped the flag though, so signal the
            // freshly stored task here instead of leaving it ticking.
            if !self.loop_running.load(Ordering::Acquire) {
                if let Some(task) = task_slot.take() {
                    let _ = task.shutdown_tx.send(true);
                }
            }
        }

        // One attempt immediately, further attempts on the interval.
        self.restart_attempt().await;
    }

    /// Reconnecting -> Idle. Cancels only the future tick; an in-flight
    /// attempt completes before the loop task observes the signal.
    async fn stop_loop(&self) {
        if self
            .loop_running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        if let Some(task) = self.loop_task.lock().await.take() {
            let _ = task.shutdown_tx.send(true);
        }
        info!("broker reconnect loop stopped");
    }

    /// Single restart attempt. The `restart_in_progress` guard silently
    /// skips a collision with another attempt; failures are logged and
    /// swallowed so the loop always reaches its next tick.
    async fn restart_attempt(&self) {
        let RelayMode::External { connector, handle } = &self.mode else {
            debug!("no external broker configured, skipping restart attempt");
            return;
        };
        if self
            .restart_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        if let Err(e) = Self::run_restart(connector, handle.as_ref()).await {
            warn!(error = %e, "broker restart attempt failed");
        }
        self.restart_in_progress.store(false, Ordering::Release);
    }

    async fn run_restart(connector: &FailoverConnector, handle: &H) -> Result<(), RelayError> {
        if handle.is_running() {
            handle.stop().await?;
        }
        let endpoint = connector.next_endpoint();
        debug!(endpoint = %endpoint, "starting broker relay");
        handle.start(&endpoint).await?;
        Ok(())
    }
}
