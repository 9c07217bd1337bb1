//! Top-level error type for the broker-relay core
//!
//! Each module keeps its own focused error enum; this aggregate exists for
//! callers that wire several components together and want one `?` boundary.

use thiserror::Error;

/// Aggregate error for broker-relay operations
#[derive(Debug, Error)]
pub enum RelayCoreError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("relay error: {0}")]
    Relay(#[from] crate::relay::RelayError),

    #[error("codec error: {0}")]
    Codec(#[from] crate::codec::CodecError),
}

/// Result type for broker-relay operations
pub type RelayResult<T> = Result<T, RelayCoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::relay::RelayError;

    #[test]
    fn test_module_errors_convert_into_aggregate() {
        let relay_err: RelayCoreError = RelayError::Unreachable("a:61613".to_string()).into();
        assert!(matches!(relay_err, RelayCoreError::Relay(_)));

        let codec_err: RelayCoreError =
            CodecError::Conversion("payload is not JSON".to_string()).into();
        assert!(matches!(codec_err, RelayCoreError::Codec(_)));
    }

    #[test]
    fn test_aggregate_error_display_is_nonempty() {
        let err: RelayCoreError = RelayError::Unreachable("a:61613".to_string()).into();
        assert!(!err.to_string().is_empty());
    }
}
