//! Broker address validation
//!
//! Raw configured addresses are `host:port` strings. Invalid entries are
//! dropped with a warning rather than failing startup; an empty result means
//! the node runs against the embedded broker.

use std::fmt;
use thiserror::Error;
use tracing::warn;
use url::Url;

/// A validated broker network address, parsed once from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrokerEndpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for BrokerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Address parsing errors
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("invalid broker address: {0}")]
    Invalid(String),
    #[error("broker address is missing a port: {0}")]
    MissingPort(String),
}

/// Parse a single `host:port` entry.
pub fn parse_endpoint(raw: &str) -> Result<BrokerEndpoint, AddressError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(AddressError::Invalid(raw.to_string()));
    }

    // Piggyback on URL parsing for host validation; the scheme is synthetic.
    let url = Url::parse(&format!("tcp://{trimmed}"))
        .map_err(|_| AddressError::Invalid(raw.to_string()))?;

    let host = url
        .host_str()
        .ok_or_else(|| AddressError::Invalid(raw.to_string()))?
        .to_string();
    let port = url
        .port()
        .ok_or_else(|| AddressError::MissingPort(raw.to_string()))?;

    Ok(BrokerEndpoint { host, port })
}

/// Validate a list of raw addresses, dropping unparsable entries.
pub fn resolve_endpoints<S: AsRef<str>>(raw: &[S]) -> Vec<BrokerEndpoint> {
    raw.iter()
        .filter_map(|entry| match parse_endpoint(entry.as_ref()) {
            Ok(endpoint) => Some(endpoint),
            Err(e) => {
                warn!(address = entry.as_ref(), error = %e, "dropping invalid broker address");
                None
            }
        })
        .collect()
}

/// Validate the configured comma-separated address list.
pub fn resolve_address_csv(csv: &str) -> Vec<BrokerEndpoint> {
    let entries: Vec<&str> = csv
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();
    resolve_endpoints(&entries)
}
