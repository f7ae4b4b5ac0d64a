//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Own the pooled `reqwest::Client` shared by every handler
//! - Apply the configured connect/read timeouts (none by default)
//! - Optionally ignore proxy settings from the environment
//! - Carry the chunk bound used by the range streamer
//!
//! The forwarding operations themselves live in sibling modules as
//! `impl Upstream` blocks.

use std::time::Duration;

use crate::config::UpstreamConfig;

/// Handle to the upstream side of the relay. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub(crate) client: reqwest::Client,
    pub(crate) chunk_bytes: usize,
}

impl Upstream {
    /// Build the shared client from configuration.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());

        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = config.read_timeout_secs {
            builder = builder.read_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            chunk_bytes: config.stream_chunk_bytes.max(1),
        })
    }

    /// Largest chunk the range streamer hands downstream.
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }
}
