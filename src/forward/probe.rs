//! Size probe via HEAD.

use axum::http::header;
use url::Url;

use crate::forward::client::Upstream;
use crate::forward::outcome::{classify, UpstreamOutcome};

impl Upstream {
    /// HEAD `url` and return its `Content-Length` header text, if any.
    ///
    /// A missing (or non-ASCII) header is `Ok(None)`, not a failure.
    pub async fn probe_size(&self, url: &Url) -> UpstreamOutcome<Option<String>> {
        tracing::debug!(url = %url, "Probing size");
        let response = classify(self.client.head(url.clone()).send().await)?;

        Ok(response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string))
    }
}
