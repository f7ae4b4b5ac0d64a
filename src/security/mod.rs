//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → auth.rs (basic-auth check, 401 on any failure)
//!     → Pass to handler
//!
//! Upstream response:
//!     → headers.rs (strip hop-by-hop and stale framing headers)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any credential problem
//! - Constant-time credential comparison
//! - No trust in upstream framing headers on re-chunked bodies

pub mod auth;
pub mod headers;

pub use auth::{AuthGate, AuthResult, Credentials};
pub use headers::{sanitize, strip_hop_by_hop};
