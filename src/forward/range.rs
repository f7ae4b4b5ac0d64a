//! Byte-range streaming.
//!
//! # Data Flow
//! ```text
//! GET url  (Range: bytes=<start>-<end>, Accept-Encoding: identity)
//!     → upstream body frames (reqwest bytes_stream)
//!     → ChunkStream (re-slices frames to at most `chunk_bytes`)
//!     → downstream body, one chunk at a time
//! ```
//!
//! # Design Decisions
//! - The body is pulled lazily; nothing is accumulated
//! - Dropping the stream drops the upstream response, which closes the
//!   upstream connection (downstream disconnect cancels the upstream read)
//! - The range is not validated; upstream decides what it means

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use futures_util::stream::{BoxStream, Stream, StreamExt};
use url::Url;

use crate::forward::client::Upstream;
use crate::forward::outcome::{classify, UpstreamOutcome};
use crate::security::headers::sanitize;

/// `Range` header value for an inclusive byte range.
pub fn range_header(start: i64, end: i64) -> String {
    format!("bytes={start}-{end}")
}

/// Finite, non-restartable sequence of body chunks, each at most `max_chunk`
/// bytes long.
pub struct ChunkStream<E> {
    inner: BoxStream<'static, Result<Bytes, E>>,
    pending: Bytes,
    max_chunk: usize,
}

impl<E> ChunkStream<E> {
    pub fn new<S>(inner: S, max_chunk: usize) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    {
        Self {
            inner: inner.boxed(),
            pending: Bytes::new(),
            max_chunk: max_chunk.max(1),
        }
    }

    fn take_chunk(&mut self) -> Bytes {
        if self.pending.len() <= self.max_chunk {
            std::mem::take(&mut self.pending)
        } else {
            self.pending.split_to(self.max_chunk)
        }
    }
}

impl<E: std::fmt::Display> Stream for ChunkStream<E> {
    type Item = Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if !this.pending.is_empty() {
                return Poll::Ready(Some(Ok(this.take_chunk())));
            }
            match this.inner.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(frame))) => this.pending = frame,
                Poll::Ready(Some(Err(e))) => {
                    tracing::warn!(error = %e, "Upstream stream broke mid-transfer");
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Partial upstream response ready to stream downstream.
pub struct RangeReply {
    /// Upstream status, relayed verbatim (normally 206).
    pub status: StatusCode,
    /// Sanitized upstream headers; always carries a content type.
    pub headers: HeaderMap,
    pub body: ChunkStream<reqwest::Error>,
}

impl Upstream {
    /// Request `bytes=<start>-<end>` of `url` and hand back a lazy body.
    pub async fn forward_range(&self, url: &Url, start: i64, end: i64) -> UpstreamOutcome<RangeReply> {
        let range = range_header(start, end);
        tracing::debug!(url = %url, range = %range, "Forwarding range GET");

        let result = self
            .client
            .get(url.clone())
            .header(header::RANGE, range)
            .header(header::ACCEPT_ENCODING, "identity")
            .send()
            .await;
        let response = classify(result)?;

        let status = response.status();
        let mut headers = sanitize(response.headers());
        headers
            .entry(header::CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/octet-stream"));

        Ok(RangeReply {
            status,
            headers,
            body: ChunkStream::new(response.bytes_stream(), self.chunk_bytes),
        })
    }
}
