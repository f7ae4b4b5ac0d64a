//! Classification of upstream call results.
//!
//! Every upstream call site returns [`UpstreamOutcome`]: the success value, or
//! exactly one [`UpstreamFailure`]. Nothing on the request path panics or
//! bubbles an unclassified error to the serving layer.

use std::error::Error as _;
use std::fmt;

use axum::http::StatusCode;
use url::Url;

/// Result of one forwarded call.
pub type UpstreamOutcome<T> = Result<T, UpstreamFailure>;

/// Failure taxonomy for forwarded calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Upstream could not be reached (DNS, refused, TLS, timeout, broken body).
    NetworkFailure,
    /// Upstream answered with a non-2xx status.
    UpstreamHttpError,
    /// Caller-supplied auxiliary data could not be parsed.
    MalformedInput,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::NetworkFailure => "network_failure",
            FailureKind::UpstreamHttpError => "upstream_http_error",
            FailureKind::MalformedInput => "malformed_input",
        };
        f.write_str(name)
    }
}

/// A classified failure carrying a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamFailure {
    #[error("{message}")]
    Network { message: String },
    #[error("{message}")]
    Http { status: StatusCode, message: String },
    #[error("{message}")]
    MalformedInput { message: String },
}

impl UpstreamFailure {
    pub fn malformed(message: impl Into<String>) -> Self {
        UpstreamFailure::MalformedInput {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            UpstreamFailure::Network { .. } => FailureKind::NetworkFailure,
            UpstreamFailure::Http { .. } => FailureKind::UpstreamHttpError,
            UpstreamFailure::MalformedInput { .. } => FailureKind::MalformedInput,
        }
    }

    /// Upstream status, present only for [`FailureKind::UpstreamHttpError`].
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamFailure::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            UpstreamFailure::Network { message }
            | UpstreamFailure::Http { message, .. }
            | UpstreamFailure::MalformedInput { message } => message,
        }
    }

    /// Map a transport error (nothing usable came back from upstream).
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let class = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else if err.is_body() || err.is_decode() {
            "body"
        } else if err.is_redirect() {
            "redirect"
        } else {
            "request"
        };
        tracing::warn!(error = %err, class, "Upstream unreachable");

        let mut message = format!("Upstream request failed: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        UpstreamFailure::Network { message }
    }

    /// Describe a non-2xx status the way an HTTP status line reads.
    pub fn from_status(status: StatusCode, url: &Url) -> Self {
        let class = if status.is_client_error() {
            "Client Error"
        } else if status.is_server_error() {
            "Server Error"
        } else {
            "Unexpected Status"
        };
        let reason = status.canonical_reason().unwrap_or("Unknown");
        UpstreamFailure::Http {
            status,
            message: format!("{} {class}: {reason} for url: {url}", status.as_u16()),
        }
    }
}

/// Classify a completed upstream call: transport errors become
/// [`FailureKind::NetworkFailure`], non-2xx statuses become
/// [`FailureKind::UpstreamHttpError`].
pub fn classify(
    result: Result<reqwest::Response, reqwest::Error>,
) -> UpstreamOutcome<reqwest::Response> {
    let response = result.map_err(|e| UpstreamFailure::from_transport(&e))?;
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::warn!(status = %status, url = %response.url(), "Upstream returned error status");
        Err(UpstreamFailure::from_status(status, response.url()))
    }
}

/// Parse a caller-supplied upstream URL. Only absolute http(s) URLs pass.
pub fn parse_target(raw: &str) -> UpstreamOutcome<Url> {
    let url = Url::parse(raw)
        .map_err(|e| UpstreamFailure::malformed(format!("Invalid url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UpstreamFailure::malformed(format!(
            "Unsupported url scheme '{other}' in '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://example.com/missing").unwrap()
    }

    #[test]
    fn status_messages_follow_status_class() {
        let not_found = UpstreamFailure::from_status(StatusCode::NOT_FOUND, &url());
        assert_eq!(
            not_found.message(),
            "404 Client Error: Not Found for url: https://example.com/missing"
        );
        assert_eq!(not_found.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(not_found.kind(), FailureKind::UpstreamHttpError);

        let broken = UpstreamFailure::from_status(StatusCode::BAD_GATEWAY, &url());
        assert!(broken.message().starts_with("502 Server Error: Bad Gateway"));

        let moved = UpstreamFailure::from_status(StatusCode::NOT_MODIFIED, &url());
        assert!(moved.message().starts_with("304 Unexpected Status"));
    }

    #[test]
    fn malformed_input_has_no_status() {
        let failure = UpstreamFailure::malformed("bad headers");
        assert_eq!(failure.kind(), FailureKind::MalformedInput);
        assert_eq!(failure.status(), None);
        assert_eq!(failure.to_string(), "bad headers");
    }

    #[test]
    fn parse_target_accepts_only_absolute_http() {
        assert!(parse_target("https://example.com/a?b=c").is_ok());
        assert!(parse_target("http://127.0.0.1:8080/").is_ok());

        for bad in ["", "example.com/a", "/relative", "ftp://example.com/file"] {
            let failure = parse_target(bad).unwrap_err();
            assert_eq!(failure.kind(), FailureKind::MalformedInput, "{bad}");
        }
    }
}
