//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (filter + file/stderr writer)
//!
//! Per request:
//!     → x-request-id assigned by the HTTP layer
//!     → TraceLayer span wraps handler logs
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every handler span
//! - Credentials and request bodies are never logged

pub mod logging;

pub use logging::{init_logging, parse_level, LoggingError};
