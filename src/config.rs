//! Configuration for the broker-relay subsystem
//!
//! Loaded from a TOML file. Broker credentials are indirected through
//! environment variable names so secrets never land in the config file
//! itself; they are resolved at call time, not at load time.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Top-level relay configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayConfig {
    pub broker: BrokerSection,
    #[serde(default)]
    pub cluster: ClusterSection,
}

/// Broker section: addresses, credentials, retry schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrokerSection {
    /// Ordered comma-separated `host:port` list. Empty means no external
    /// broker is configured and the node falls back to the embedded one.
    /// All cluster nodes must carry the identical list in the same order.
    #[serde(default)]
    pub addresses: String,
    /// Environment variable containing the broker login
    pub username_env: Option<String>,
    /// Environment variable containing the broker passcode
    pub password_env: Option<String>,
    /// Fixed delay between reconnect attempts in seconds (default: 10)
    #[serde(default = "default_retry_interval_secs")]
    pub retry_interval_secs: u64,
}

fn default_retry_interval_secs() -> u64 {
    10
}

/// Cluster section: identity of this node in the shared status map
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClusterSection {
    /// Stable member id for the distributed status map. When absent a
    /// random id is generated at startup.
    pub member_id: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl RelayConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: RelayConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

impl BrokerSection {
    /// Split the configured CSV into trimmed, non-empty address entries.
    /// Validation of each entry happens in the endpoint resolver.
    pub fn address_list(&self) -> Vec<String> {
        self.addresses
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Fixed reconnect interval
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    /// Broker login from the configured environment variable
    pub fn username(&self) -> Option<String> {
        resolve_env_optional(self.username_env.as_ref())
    }

    /// Broker passcode from the configured environment variable
    pub fn password(&self) -> Option<String> {
        resolve_env_optional(self.password_env.as_ref())
    }
}

impl ClusterSection {
    /// Configured member id, or a freshly generated one for this process.
    pub fn member_id_or_random(&self) -> String {
        self.member_id
            .clone()
            .unwrap_or_else(crate::cluster::random_member_id)
    }
}

fn resolve_env_optional(env_var_name: Option<&String>) -> Option<String> {
    env_var_name.and_then(|name| std::env::var(name).ok())
}
