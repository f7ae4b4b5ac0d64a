//! Whole-body forwarding with a normalized envelope.
//!
//! GET and POST calls wait for the complete upstream body, decode it as text
//! and report `{response, success}`. `success` is true iff upstream answered 2xx.

use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::forward::client::Upstream;
use crate::forward::outcome::{classify, UpstreamFailure, UpstreamOutcome};

/// Normalized result of a whole-body forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub response: String,
    pub success: bool,
}

impl Envelope {
    pub fn success(body: String) -> Self {
        Self {
            response: body,
            success: true,
        }
    }

    pub fn failure(failure: &UpstreamFailure) -> Self {
        Self {
            response: failure.message().to_string(),
            success: false,
        }
    }
}

impl From<&UpstreamOutcome<String>> for Envelope {
    fn from(outcome: &UpstreamOutcome<String>) -> Self {
        match outcome {
            Ok(body) => Envelope::success(body.clone()),
            Err(failure) => Envelope::failure(failure),
        }
    }
}

/// Arguments of a POST forward, supplied as one JSON object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostArgs {
    /// Re-serialized as the upstream request body.
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl PostArgs {
    pub fn parse(args_json: &str) -> UpstreamOutcome<Self> {
        serde_json::from_str(args_json)
            .map_err(|e| UpstreamFailure::malformed(format!("Invalid args_json: {e}")))
    }
}

/// Parse a JSON object of header names to string values.
pub fn parse_header_json(headers_json: &str) -> UpstreamOutcome<HeaderMap> {
    let raw: HashMap<String, String> = serde_json::from_str(headers_json)
        .map_err(|e| UpstreamFailure::malformed(format!("Invalid headers: {e}")))?;
    to_header_map(&raw)
}

/// Convert a name→value mapping into a header map, rejecting names or values
/// that cannot appear on the wire.
pub fn to_header_map(raw: &HashMap<String, String>) -> UpstreamOutcome<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(raw.len());
    for (name, value) in raw {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| UpstreamFailure::malformed(format!("Invalid header name '{name}'")))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            UpstreamFailure::malformed(format!("Invalid value for header '{name}'"))
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

impl Upstream {
    /// GET `url` with optional extra headers and return the body as text.
    pub async fn forward_get(&self, url: &Url, extra_headers: HeaderMap) -> UpstreamOutcome<String> {
        tracing::debug!(url = %url, extra_headers = extra_headers.len(), "Forwarding GET");
        let result = self
            .client
            .get(url.clone())
            .headers(extra_headers)
            .send()
            .await;
        read_text(classify(result)?).await
    }

    /// POST `args.data` as JSON text to `url` with `args.headers`.
    ///
    /// Upstream status failures are prefixed with the numeric status.
    pub async fn forward_post(&self, url: &Url, args: &PostArgs) -> UpstreamOutcome<String> {
        let headers = to_header_map(&args.headers)?;
        let body = serde_json::to_string(&args.data)
            .map_err(|e| UpstreamFailure::malformed(format!("Invalid data: {e}")))?;

        tracing::debug!(url = %url, body_bytes = body.len(), "Forwarding POST");
        let result = self
            .client
            .post(url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await;

        match classify(result) {
            Ok(response) => read_text(response).await,
            Err(UpstreamFailure::Http { status, message }) => Err(UpstreamFailure::Http {
                status,
                message: format!("Response returned {}, {message}", status.as_u16()),
            }),
            Err(other) => Err(other),
        }
    }
}

async fn read_text(response: reqwest::Response) -> UpstreamOutcome<String> {
    response
        .text()
        .await
        .map_err(|e| UpstreamFailure::from_transport(&e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::outcome::FailureKind;
    use axum::http::StatusCode;

    #[test]
    fn envelope_reflects_outcome() {
        let ok: UpstreamOutcome<String> = Ok("ok".into());
        assert_eq!(
            Envelope::from(&ok),
            Envelope {
                response: "ok".into(),
                success: true
            }
        );

        let url = Url::parse("https://example.com/x").unwrap();
        let failed: UpstreamOutcome<String> =
            Err(UpstreamFailure::from_status(StatusCode::NOT_FOUND, &url));
        let envelope = Envelope::from(&failed);
        assert!(!envelope.success);
        assert!(envelope.response.contains("404"));
    }

    #[test]
    fn envelope_serializes_with_both_fields() {
        let json = serde_json::to_value(Envelope::success("hi".into())).unwrap();
        assert_eq!(json, serde_json::json!({ "response": "hi", "success": true }));
    }

    #[test]
    fn post_args_default_to_empty() {
        let args = PostArgs::parse("{}").unwrap();
        assert_eq!(args.data, serde_json::json!({}));
        assert!(args.headers.is_empty());

        let args = PostArgs::parse(r#"{"data": {"k": [1, 2]}, "headers": {"X-Key": "v"}}"#).unwrap();
        assert_eq!(args.data, serde_json::json!({ "k": [1, 2] }));
        assert_eq!(args.headers["X-Key"], "v");
    }

    #[test]
    fn malformed_post_args_are_classified() {
        for bad in ["not json", "[1, 2]", r#"{"headers": {"X": 1}}"#] {
            let failure = PostArgs::parse(bad).unwrap_err();
            assert_eq!(failure.kind(), FailureKind::MalformedInput, "{bad}");
        }
    }

    #[test]
    fn header_json_is_validated() {
        let headers = parse_header_json(r#"{"Accept": "text/plain", "X-Trace": "1"}"#).unwrap();
        assert_eq!(headers["accept"], "text/plain");
        assert_eq!(headers["x-trace"], "1");

        assert!(parse_header_json("{").is_err());
        assert!(parse_header_json(r#"{"bad name": "v"}"#).is_err());
        assert!(parse_header_json(r#"{"X": "line\nbreak"}"#).is_err());
    }
}
