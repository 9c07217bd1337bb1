//! Relay handle seam
//!
//! The concrete wire client (TCP connect, STOMP handshake, frame pump) lives
//! behind the [`RelayHandle`] trait so the supervisor can be driven against
//! mocks and so the transport's own connect/handshake timeouts stay the only
//! bound on a restart attempt.

use super::endpoint::BrokerEndpoint;
use super::failover::FailoverConnector;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Relay transport errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay start failed")]
    StartFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("relay stop failed")]
    StopFailed(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("broker endpoint unreachable: {0}")]
    Unreachable(String),
}

/// Handle to the running relay: the component forwarding pub/sub traffic to
/// the external broker.
#[async_trait]
pub trait RelayHandle: Send + Sync + 'static {
    /// Bind the relay to the given endpoint and start it.
    async fn start(&self, endpoint: &BrokerEndpoint) -> Result<(), RelayError>;

    /// Stop the relay. Must be safe to call when already stopped.
    async fn stop(&self) -> Result<(), RelayError>;

    /// Whether the relay is currently running.
    fn is_running(&self) -> bool;
}

/// Whether this node relays to an external broker at all.
///
/// Call sites pattern-match instead of null-checking an optional handle:
/// embedded mode short-circuits every manual control operation.
pub enum RelayMode<H: RelayHandle> {
    /// No external broker configured; the embedded broker serves this node.
    Embedded,
    /// External broker configured: a failover connector plus the relay handle
    /// it binds.
    External {
        connector: FailoverConnector,
        handle: Arc<H>,
    },
}

impl<H: RelayHandle> RelayMode<H> {
    pub fn external(connector: FailoverConnector, handle: Arc<H>) -> Self {
        Self::External { connector, handle }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded)
    }
}
