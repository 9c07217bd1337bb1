//! Clustered broker-relay core
//!
//! This crate implements the client side of the relay between application
//! server nodes and an external STOMP-style message broker:
//!
//! - Failover connector cycling round-robin through configured broker
//!   endpoints, with embedded-broker fallback when none are configured
//! - Reconnection supervisor that keeps the relay alive across broker
//!   outages, with manual connect/disconnect/reconnect controls
//! - Broker availability tracking mirrored into a cluster-shared status map
//! - Subscription admission policy gating which principals may subscribe to
//!   which destinations
//! - Transparent gzip+base64 payload compression around the JSON converter
//!
//! Broker storage, durability and routing stay with the externally operated
//! broker; identity and entity lookups are injected behind traits.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use broker_relay::cluster::InMemoryStatusMap;
//! use broker_relay::relay::{
//!     resolve_address_csv, AvailabilityTracker, ConnectorFactory, ReconnectionSupervisor,
//!     RelayMode, DEFAULT_RETRY_INTERVAL,
//! };
//! use broker_relay::testing::mocks::MockRelayHandle;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let endpoints = resolve_address_csv("broker-1:61613,broker-2:61613");
//! let status_map = Arc::new(InMemoryStatusMap::new());
//! let tracker = Arc::new(AvailabilityTracker::new("node-1", status_map));
//!
//! let mode = match ConnectorFactory::create(endpoints) {
//!     Some(connector) => RelayMode::external(connector, Arc::new(MockRelayHandle::new())),
//!     None => RelayMode::Embedded,
//! };
//! let supervisor = ReconnectionSupervisor::new(mode, tracker, DEFAULT_RETRY_INTERVAL);
//!
//! // Broker went down: the supervisor starts its retry loop.
//! supervisor.on_availability_changed(false).await;
//! # });
//! ```

pub mod cluster;
pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod health;
pub mod observability;
pub mod relay;
pub mod testing;

pub use cluster::{ClusterStatusMap, InMemoryStatusMap};
pub use codec::{
    CodecError, CompressingConverter, FrameHeaders, HeaderValue, JsonPayloadConverter, Payload,
    PayloadConverter, COMPRESSION_HEADER,
};
pub use config::{BrokerSection, ClusterSection, ConfigError, RelayConfig};
pub use error::{RelayCoreError, RelayResult};
pub use gateway::{
    AccessDecision, AuthorityService, CourseRole, EntityDirectory, FrameCommand, LookupError,
    SubscriptionGateway, SubscriptionRequest,
};
pub use health::{
    BrokerHealthCheck, HealthCheck, HealthCheckManager, HealthCheckResult, RelayHealth,
};
pub use relay::{
    AvailabilityTracker, BrokerEndpoint, ConnectorFactory, FailoverConnector,
    ReconnectionSupervisor, RelayError, RelayHandle, RelayMode,
};
