//! Credential-gated HTTP relay library.
//!
//! Accepts authenticated requests naming an upstream URL, forwards them and
//! returns the upstream answer: as a normalized envelope, verbatim, as a
//! streamed byte range, or as a size probe.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
