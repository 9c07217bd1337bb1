//! Round-robin failover connector
//!
//! Every connection attempt advances a cyclic cursor over the validated
//! endpoint list. All cluster nodes are configured with the identical list
//! and therefore iterate in the same order: under normal conditions each
//! node prefers the same broker, and during a cluster-wide failover every
//! node moves to the same next endpoint. Inconsistent per-node orderings
//! (partial rollout) are assumed not to occur and are not detected.

use super::endpoint::BrokerEndpoint;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Cyclic endpoint iterator shared by all connection attempts of one node.
#[derive(Debug)]
pub struct FailoverConnector {
    endpoints: Vec<BrokerEndpoint>,
    cursor: AtomicUsize,
}

impl FailoverConnector {
    fn new(endpoints: Vec<BrokerEndpoint>) -> Self {
        debug_assert!(!endpoints.is_empty());
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Advance to the next endpoint, wrapping after the last one.
    pub fn next_endpoint(&self) -> BrokerEndpoint {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.endpoints.len();
        self.endpoints[index].clone()
    }

    /// The validated endpoint list in configured order.
    pub fn endpoints(&self) -> &[BrokerEndpoint] {
        &self.endpoints
    }
}

/// Builds the failover connector from validated endpoints.
pub struct ConnectorFactory;

impl ConnectorFactory {
    /// Returns `None` for an empty list: no external broker is configured
    /// and the caller must fall back to the embedded one.
    pub fn create(endpoints: Vec<BrokerEndpoint>) -> Option<FailoverConnector> {
        if endpoints.is_empty() {
            debug!("no valid broker address configured, falling back to embedded broker");
            return None;
        }
        Some(FailoverConnector::new(endpoints))
    }
}
