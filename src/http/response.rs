//! Response construction.
//!
//! # Responsibilities
//! - Turn forwarding outcomes into client responses
//! - Pick the downstream status for each failure kind
//! - Attach relayed headers and bodies
//!
//! # Design Decisions
//! - Envelope routes answer 200 for upstream and network failures and 400
//!   for malformed caller input, always with an Envelope body
//! - Status-only routes never forward an upstream error body
//! - Streaming responses avoid buffering the body

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::forward::{Envelope, FailureKind, RangeReply, RawReply, UpstreamFailure, UpstreamOutcome};

/// Downstream status used by status-only routes.
pub fn failure_status(failure: &UpstreamFailure) -> StatusCode {
    match failure {
        UpstreamFailure::Http { status, .. } => *status,
        UpstreamFailure::Network { .. } => StatusCode::BAD_GATEWAY,
        UpstreamFailure::MalformedInput { .. } => StatusCode::BAD_REQUEST,
    }
}

/// Envelope response for whole-body forwarding routes.
pub fn envelope_response(outcome: UpstreamOutcome<String>) -> Response {
    let status = match &outcome {
        Err(failure) if failure.kind() == FailureKind::MalformedInput => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };
    (status, Json(Envelope::from(&outcome))).into_response()
}

/// Status with an empty body and no content type.
pub fn status_only(failure: &UpstreamFailure) -> Response {
    failure_status(failure).into_response()
}

/// Relay a raw upstream response with its end-to-end headers.
pub fn raw_response(reply: RawReply) -> Response {
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() = reply.status;
    *response.headers_mut() = reply.headers;
    response
}

/// Stream a partial upstream body with sanitized headers.
pub fn range_response(reply: RangeReply) -> Response {
    let mut response = Response::new(Body::from_stream(reply.body));
    *response.status_mut() = reply.status;
    *response.headers_mut() = reply.headers;
    response
}

/// Plain-text size; empty when upstream sent no `Content-Length`.
pub fn size_response(size: Option<String>) -> Response {
    size.unwrap_or_default().into_response()
}
