//! Broker availability tracking
//!
//! Holds the local availability flag and mirrors every transition into the
//! cluster-shared status map under this node's member id. Event delivery is
//! assumed serialized by the underlying framework; there is no additional
//! concurrency to manage on the receiving side.

use crate::cluster::ClusterStatusMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Local broker availability, mirrored into the cluster status map.
pub struct AvailabilityTracker {
    member_id: String,
    available: AtomicBool,
    status_map: Arc<dyn ClusterStatusMap>,
}

impl AvailabilityTracker {
    /// Registers this member in the status map as unavailable; the first
    /// real availability event flips it.
    pub fn new(member_id: impl Into<String>, status_map: Arc<dyn ClusterStatusMap>) -> Self {
        let member_id = member_id.into();
        status_map.put(&member_id, false);
        Self {
            member_id,
            available: AtomicBool::new(false),
            status_map,
        }
    }

    /// Record an availability transition and publish it to the cluster.
    pub fn set_available(&self, available: bool) {
        if available {
            info!(member_id = %self.member_id, "message broker is available");
        } else {
            warn!(member_id = %self.member_id, "message broker is unavailable");
        }
        self.available.store(available, Ordering::Release);
        self.status_map.put(&self.member_id, available);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    /// Remove this member's entry from the cluster status map.
    pub fn shutdown(&self) {
        self.status_map.remove(&self.member_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::InMemoryStatusMap;

    fn tracker() -> (AvailabilityTracker, Arc<InMemoryStatusMap>) {
        let map = Arc::new(InMemoryStatusMap::new());
        let tracker = AvailabilityTracker::new("node-1", map.clone());
        (tracker, map)
    }

    #[test]
    fn test_registers_unavailable_at_startup() {
        let (tracker, map) = tracker();
        assert!(!tracker.is_available());
        assert_eq!(map.snapshot().get("node-1"), Some(&false));
    }

    #[test]
    fn test_transitions_mirror_into_cluster_map() {
        let (tracker, map) = tracker();

        tracker.set_available(true);
        assert!(tracker.is_available());
        assert_eq!(map.snapshot().get("node-1"), Some(&true));

        tracker.set_available(false);
        assert!(!tracker.is_available());
        assert_eq!(map.snapshot().get("node-1"), Some(&false));
    }

    #[test]
    fn test_shutdown_removes_own_key() {
        let (tracker, map) = tracker();
        tracker.set_available(true);
        tracker.shutdown();
        assert!(!map.snapshot().contains_key("node-1"));
    }
}
