//! Observability scaffolding
//!
//! Structured logging setup for nodes embedding the relay core.

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
