//! Broker relay connection lifecycle
//!
//! Decomposed into focused sub-modules, pure selection logic kept apart from
//! the async coordination:
//!
//! - [`endpoint`] - address validation and `BrokerEndpoint` parsing
//! - [`failover`] - round-robin connector over the validated endpoint list
//! - [`handle`] - the relay-handle seam and embedded/external mode
//! - [`availability`] - local broker availability mirrored into the cluster
//! - [`supervisor`] - the reconnection state machine and manual controls

pub mod availability;
pub mod endpoint;
pub mod failover;
pub mod handle;
pub mod supervisor;

pub use availability::AvailabilityTracker;
pub use endpoint::{
    parse_endpoint, resolve_address_csv, resolve_endpoints, AddressError, BrokerEndpoint,
};
pub use failover::{ConnectorFactory, FailoverConnector};
pub use handle::{RelayError, RelayHandle, RelayMode};
pub use supervisor::{ReconnectionSupervisor, DEFAULT_RETRY_INTERVAL};
