//! Response header sanitizing.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers before relaying upstream headers downstream
//! - Raw passthrough keeps framing headers and drops only hop-by-hop ones
//! - Strip stale framing (`content-length`, `content-encoding`) so the
//!   serving layer recomputes it for the body actually sent
//!
//! # Design Decisions
//! - Produces a fresh map; the upstream map is never mutated
//! - Multi-valued headers (e.g. `set-cookie`) keep every value

use axum::http::header::{HeaderMap, HeaderName};

/// Connection-scoped headers, lowercase. The serving layer owns these for
/// the downstream hop.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    // "trailers" is the historical spelling; "trailer" is the registered name.
    "trailers",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Framing headers describing the upstream body, lowercase.
pub const FRAMING_HEADERS: &[&str] = &["content-length", "content-encoding"];

/// Check if a header is connection-scoped.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    // HeaderName is always stored lowercase.
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Check if a header must be dropped when relaying a re-framed body.
pub fn is_stripped(name: &HeaderName) -> bool {
    is_hop_by_hop(name) || FRAMING_HEADERS.contains(&name.as_str())
}

/// Copy `headers`, leaving out every stripped header.
pub fn sanitize(headers: &HeaderMap) -> HeaderMap {
    filtered(headers, is_stripped)
}

/// Copy `headers`, leaving out only connection-scoped headers. Used when the
/// body is relayed byte for byte, so `content-length` still holds.
pub fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    filtered(headers, is_hop_by_hop)
}

fn filtered(headers: &HeaderMap, skip: fn(&HeaderName) -> bool) -> HeaderMap {
    let mut clean = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !skip(name) {
            clean.append(name.clone(), value.clone());
        }
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn upstream_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            ("Connection", "keep-alive"),
            ("Keep-Alive", "timeout=5"),
            ("Proxy-Authenticate", "Basic"),
            ("PROXY-AUTHORIZATION", "Basic abc"),
            ("TE", "trailers"),
            ("Trailers", "Expires"),
            ("Transfer-Encoding", "chunked"),
            ("Upgrade", "h2c"),
            ("Content-Length", "4096"),
            ("Content-Encoding", "gzip"),
            ("Content-Type", "application/octet-stream"),
            ("Content-Range", "bytes 0-99/4096"),
            ("Set-Cookie", "a=1"),
            ("Set-Cookie", "b=2"),
        ] {
            headers.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static(value),
            );
        }
        headers
    }

    #[test]
    fn strips_regardless_of_casing() {
        let clean = sanitize(&upstream_headers());
        for name in HOP_BY_HOP_HEADERS.iter().chain(FRAMING_HEADERS) {
            assert!(!clean.contains_key(*name), "{name} survived");
        }
    }

    #[test]
    fn keeps_end_to_end_headers() {
        let clean = sanitize(&upstream_headers());
        assert_eq!(clean["content-type"], "application/octet-stream");
        assert_eq!(clean["content-range"], "bytes 0-99/4096");
        assert_eq!(clean.get_all("set-cookie").iter().count(), 2);
        assert_eq!(clean.len(), 4);
    }

    #[test]
    fn hop_by_hop_strip_keeps_framing() {
        let clean = strip_hop_by_hop(&upstream_headers());
        for name in HOP_BY_HOP_HEADERS {
            assert!(!clean.contains_key(*name), "{name} survived");
        }
        assert_eq!(clean["content-length"], "4096");
        assert_eq!(clean["content-encoding"], "gzip");
        assert_eq!(clean.get_all("set-cookie").iter().count(), 2);
        assert_eq!(clean.len(), 6);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize(&upstream_headers());
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn leaves_input_untouched() {
        let original = upstream_headers();
        let before = original.clone();
        let _ = sanitize(&original);
        assert_eq!(original, before);
    }
}
