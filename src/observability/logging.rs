//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Map the configured level name onto a tracing filter
//! - Route output to a log file or stderr
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides the configured level when present
//! - File output is appended without ANSI colors

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Error type for logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("global subscriber already set: {0}")]
    Install(String),
}

/// Parse a level name, accepting the long-form spellings used by older
/// deployments (`WARNING`, `CRITICAL`) alongside tracing's own names.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" | "critical" | "fatal" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Install the global tracing subscriber described by `config`.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), LoggingError> {
    let level = parse_level(&config.log_level)
        .ok_or_else(|| LoggingError::UnknownLevel(config.log_level.clone()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into()));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let installed = if config.log_file == "-" {
        builder.with_writer(std::io::stderr).try_init()
    } else {
        let path = PathBuf::from(&config.log_file);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggingError::Open { path, source })?;
        builder
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init()
    };

    installed.map_err(|e| LoggingError::Install(e.to_string()))
}
