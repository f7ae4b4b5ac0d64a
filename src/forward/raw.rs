//! Raw passthrough of an upstream GET.
//!
//! The upstream body is relayed as received, with the upstream headers minus
//! the connection-scoped ones (`transfer-encoding` among them: the body is
//! already de-chunked). `content-type` and `content-length` pass through.
//! The content-type bucket is informational only.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use url::Url;

use crate::forward::client::Upstream;
use crate::forward::outcome::{classify, UpstreamFailure, UpstreamOutcome};
use crate::security::headers::strip_hop_by_hop;

/// Coarse category of an upstream `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentBucket {
    Json,
    Image,
    OctetStream,
    Other,
}

impl ContentBucket {
    pub fn classify(content_type: Option<&str>) -> Self {
        let Some(content_type) = content_type else {
            return ContentBucket::Other;
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" {
            ContentBucket::Json
        } else if essence.starts_with("image/") {
            ContentBucket::Image
        } else if essence == "application/octet-stream" {
            ContentBucket::OctetStream
        } else {
            ContentBucket::Other
        }
    }
}

/// A fully read upstream response with its end-to-end headers.
#[derive(Debug)]
pub struct RawReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub bucket: ContentBucket,
}

impl Upstream {
    /// GET `url` and read the whole body without decoding it.
    pub async fn forward_raw(&self, url: &Url) -> UpstreamOutcome<RawReply> {
        tracing::debug!(url = %url, "Forwarding raw GET");
        let response = classify(self.client.get(url.clone()).send().await)?;

        let status = response.status();
        let headers = strip_hop_by_hop(response.headers());
        let bucket = ContentBucket::classify(
            headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamFailure::from_transport(&e))?;

        tracing::debug!(url = %url, ?bucket, bytes = body.len(), "Raw body received");
        Ok(RawReply {
            status,
            headers,
            body,
            bucket,
        })
    }
}
