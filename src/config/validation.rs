//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, chunk size > 0)
//! - Check the credential pair and log level are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::RelayConfig;
use crate::observability::logging::parse_level;
use crate::security::auth::Credentials;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,
    #[error("auth.credentials must have the form username:password")]
    MalformedCredentials,
    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
    #[error("upstream.stream_chunk_bytes must be greater than zero")]
    ZeroChunkSize,
    #[error("{0} must be greater than zero when set")]
    ZeroTimeout(&'static str),
}

/// Check every semantic constraint and collect all failures.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if Credentials::parse(&config.auth.credentials).is_err() {
        errors.push(ValidationError::MalformedCredentials);
    }

    if parse_level(&config.observability.log_level).is_none() {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.upstream.stream_chunk_bytes == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }

    if config.upstream.connect_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }
    if config.upstream.read_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("upstream.read_timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
