//! Forwarding core.
//!
//! # Data Flow
//! ```text
//! handler (authenticated)
//!     → outcome.rs   parse_target(url)
//!     → whole.rs     forward_get / forward_post → Envelope
//!       raw.rs       forward_raw   → status + end-to-end headers + bytes
//!       range.rs     forward_range → status + sanitized headers + ChunkStream
//!       probe.rs     probe_size    → Content-Length text
//!     → outcome.rs   classify every upstream result
//! ```
//!
//! # Design Decisions
//! - One attempt per call; no retries
//! - Every call site returns `UpstreamOutcome<T>`
//! - Only the range path streams; the others read the whole body

pub mod client;
pub mod outcome;
pub mod probe;
pub mod range;
pub mod raw;
pub mod whole;

pub use client::Upstream;
pub use outcome::{classify, parse_target, FailureKind, UpstreamFailure, UpstreamOutcome};
pub use range::{ChunkStream, RangeReply};
pub use raw::{ContentBucket, RawReply};
pub use whole::{Envelope, PostArgs};
