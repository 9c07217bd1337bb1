//! Structured logging via the tracing crate
//!
//! Output format is controlled by the `LOG_FORMAT` environment variable
//! (`json` for aggregation systems, `pretty` for development, `compact` for
//! terminals), the level by `LOG_LEVEL`, and `RUST_LOG` overrides the filter
//! entirely.

use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format options
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            // Default to JSON for production.
            _ => LogFormat::Json,
        }
    }
}

/// Initialize logging with explicit settings.
pub fn init_logging(level: Level, format: LogFormat, include_spans: bool) {
    let mut filter = EnvFilter::new(level.to_string())
        // Reduce noise from the runtime
        .add_directive("tokio=warn".parse().expect("static directive"))
        .add_directive("runtime=warn".parse().expect("static directive"));

    if let Ok(rust_log) = env::var("RUST_LOG") {
        filter = EnvFilter::new(rust_log);
    }

    let span_events = if include_spans {
        fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE
    } else {
        fmt::format::FmtSpan::NONE
    };

    let subscriber = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_span_events(span_events))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .pretty()
                        .with_ansi(true)
                        .with_span_events(span_events),
                )
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(
                    fmt::layer()
                        .compact()
                        .with_ansi(true)
                        .with_target(false)
                        .with_span_events(span_events),
                )
                .init();
        }
    }
}

/// Initialize logging from `LOG_LEVEL`, `LOG_FORMAT` and `LOG_SPANS`.
pub fn init_default_logging() {
    let level = match env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "INFO".to_string())
        .to_uppercase()
        .as_str()
    {
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "DEBUG" => Level::DEBUG,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    };

    let format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()));

    let include_spans = env::var("LOG_SPANS")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    init_logging(level, format, include_spans);
}
