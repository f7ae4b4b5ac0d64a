//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Credential pair used when no `auth.credentials` is configured.
pub const DEFAULT_CREDENTIALS: &str = "user:password_notdefault";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind host and port).
    pub listener: ListenerConfig,

    /// Static credential pair checked on every authenticated route.
    pub auth: AuthConfig,

    /// Upstream client settings.
    pub upstream: UpstreamConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "127.0.0.1").
    pub host: String,

    /// TCP port to bind.
    pub port: u16,

    /// Maximum accepted request body (the POST form), in bytes.
    pub max_form_bytes: usize,
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 80,
            max_form_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// `username:password`, split on the first colon.
    pub credentials: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            credentials: DEFAULT_CREDENTIALS.to_string(),
        }
    }
}

/// Upstream client configuration.
///
/// Timeouts are unset by default: the transport then waits indefinitely,
/// which is the relay's historical behavior. Set them explicitly to bound
/// slow upstreams.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: Option<u64>,

    /// Per-read timeout in seconds (applies to each body read, not the whole transfer).
    pub read_timeout_secs: Option<u64>,

    /// Upper bound on a single chunk forwarded by the range streamer.
    pub stream_chunk_bytes: usize,

    /// User-Agent sent upstream when the caller supplies none.
    pub user_agent: String,

    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            read_timeout_secs: None,
            stream_chunk_bytes: 64 * 1024,
            user_agent: concat!("http-relay/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warning, error, critical).
    pub log_level: String,

    /// Log file path; `-` writes to stderr.
    pub log_file: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warning".to_string(),
            log_file: "proxy.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_uses_defaults() {
        let config: RelayConfig = toml::from_str("[listener]\nport = 8000\n").unwrap();
        assert_eq!(config.listener.port, 8000);
        assert_eq!(config.listener.host, "127.0.0.1");
        assert_eq!(config.auth.credentials, DEFAULT_CREDENTIALS);
        assert_eq!(config.upstream.connect_timeout_secs, None);
        assert_eq!(config.observability.log_file, "proxy.log");
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let listener = ListenerConfig {
            host: "::1".into(),
            port: 9000,
            ..ListenerConfig::default()
        };
        assert_eq!(listener.bind_address(), "[::1]:9000");
    }
}
