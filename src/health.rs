//! Health reporting for the broker relay
//!
//! Aggregates the availability tracker and the relay-running state into a
//! single report for an operational health-check endpoint (the endpoint
//! itself lives outside this crate).

use crate::relay::{RelayHandle, ReconnectionSupervisor};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Health report for the broker connection of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayHealth {
    /// Configured broker addresses in failover order; empty in embedded mode.
    pub addresses: Vec<String>,
    /// Whether the relay is running. Embedded mode is trivially running.
    pub is_running: bool,
    /// Local broker availability flag.
    pub is_broker_available: bool,
}

impl RelayHealth {
    pub fn healthy(&self) -> bool {
        self.is_broker_available && self.is_running
    }
}

/// Health check result
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub component: String,
    pub healthy: bool,
    pub message: Option<String>,
}

/// Trait for components that can be health checked
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;

    fn component_name(&self) -> &str;
}

/// Broker relay health check implementation
pub struct BrokerHealthCheck<H: RelayHandle> {
    supervisor: Arc<ReconnectionSupervisor<H>>,
}

impl<H: RelayHandle> BrokerHealthCheck<H> {
    pub fn new(supervisor: Arc<ReconnectionSupervisor<H>>) -> Self {
        Self { supervisor }
    }

    /// Build the raw report without the trait wrapping.
    pub fn report(&self) -> RelayHealth {
        RelayHealth {
            addresses: self.supervisor.configured_addresses(),
            is_running: self.supervisor.is_relay_running(),
            is_broker_available: self.supervisor.tracker().is_available(),
        }
    }
}

#[async_trait]
impl<H: RelayHandle> HealthCheck for BrokerHealthCheck<H> {
    async fn health_check(&self) -> HealthCheckResult {
        let report = self.report();
        let healthy = report.healthy();

        let message = Some(format!(
            "broker available: {}, relay running: {}, addresses: [{}]",
            report.is_broker_available,
            report.is_running,
            report.addresses.join(", ")
        ));

        debug!(
            healthy,
            available = report.is_broker_available,
            running = report.is_running,
            "broker relay health check"
        );

        HealthCheckResult {
            component: self.component_name().to_string(),
            healthy,
            message,
        }
    }

    fn component_name(&self) -> &str {
        "broker_relay"
    }
}

/// Aggregated health check manager: overall health requires every component
/// to be healthy.
#[derive(Default)]
pub struct HealthCheckManager {
    health_checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthCheckManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_health_check(&mut self, health_check: Box<dyn HealthCheck>) {
        self.health_checks.push(health_check);
    }

    pub async fn run_health_checks(&self) -> Vec<HealthCheckResult> {
        let mut results = Vec::with_capacity(self.health_checks.len());
        for health_check in &self.health_checks {
            results.push(health_check.health_check().await);
        }
        results
    }

    pub async fn overall_healthy(&self) -> bool {
        let results = self.run_health_checks().await;
        if results.is_empty() {
            return true;
        }
        results.iter().all(|r| r.healthy)
    }
}
