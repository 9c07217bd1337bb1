//! Cluster-shared broker status map
//!
//! Each node publishes its local broker availability under its own member id
//! so any node can build a cluster-wide connectivity view. The seam is a
//! minimal key-value interface; any replicated-map or distributed-cache
//! technology satisfies it. Each node writes only its own key, so there is
//! no write contention; reads are last-writer-wins and stale entries from
//! ungracefully terminated nodes are an accepted, non-fatal inconsistency.

use std::collections::HashMap;
use std::sync::RwLock;

/// Minimal distributed key-value seam for per-member broker availability.
pub trait ClusterStatusMap: Send + Sync + 'static {
    /// Write this member's availability. Only the owning node calls this
    /// for its own key.
    fn put(&self, member_id: &str, available: bool);

    /// Remove this member's entry at shutdown.
    fn remove(&self, member_id: &str);

    /// Current view of every member's availability. May contain stale
    /// entries for members that crashed without cleanup.
    fn snapshot(&self) -> HashMap<String, bool>;
}

/// In-process implementation for single-node deployments and tests.
#[derive(Debug, Default)]
pub struct InMemoryStatusMap {
    entries: RwLock<HashMap<String, bool>>,
}

impl InMemoryStatusMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterStatusMap for InMemoryStatusMap {
    fn put(&self, member_id: &str, available: bool) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(member_id.to_string(), available);
    }

    fn remove(&self, member_id: &str) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(member_id);
    }

    fn snapshot(&self) -> HashMap<String, bool> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Generate a random member id for nodes without a configured one.
pub fn random_member_id() -> String {
    format!("node-{}", uuid::Uuid::new_v4())
}
