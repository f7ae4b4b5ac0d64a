//! Credential-gated HTTP relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                      RELAY                       │
//!   Client Request        │  ┌────────┐   ┌──────────┐   ┌────────────────┐  │
//!   ──────────────────────┼─▶│  http  │──▶│ security │──▶│    handlers    │  │
//!                         │  │ server │   │   auth   │   │                │  │
//!                         │  └────────┘   └──────────┘   └───────┬────────┘  │
//!                         │                                      │           │
//!                         │                                      ▼           │
//!                         │  ┌──────────┐   ┌──────────┐   ┌────────────┐    │
//!   Client Response       │  │ response │◀──│ outcome  │◀──│  forward   │◀───┼──── Upstream
//!   ◀─────────────────────┼──│ envelope │   │ classify │   │ get/post/  │    │     (url)
//!                         │  │ / stream │   └──────────┘   │ raw/range/ │    │
//!                         │  └──────────┘                  │ head       │    │
//!                         │                                └────────────┘    │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use http_relay::config::{read_config, validate_config, ConfigError, RelayConfig};
use http_relay::http::HttpServer;
use http_relay::lifecycle::{wait_for_termination, Shutdown};
use http_relay::observability::init_logging;

#[derive(Parser, Debug)]
#[command(name = "http-relay")]
#[command(about = "Credential-gated HTTP relay", long_about = None)]
struct Args {
    /// Optional TOML configuration file; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    /// trace, debug, info, warning, error or critical.
    #[arg(long)]
    log_level: Option<String>,

    /// Log file path, or `-` for stderr.
    #[arg(long)]
    log_file: Option<String>,

    /// Credential pair as `username:password`.
    #[arg(long)]
    auth: Option<String>,

    #[arg(long)]
    connect_timeout_secs: Option<u64>,

    #[arg(long)]
    read_timeout_secs: Option<u64>,
}

impl Args {
    fn into_config(self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => RelayConfig::default(),
        };

        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(file) = self.log_file {
            config.observability.log_file = file;
        }
        if let Some(auth) = self.auth {
            config.auth.credentials = auth;
        }
        if self.connect_timeout_secs.is_some() {
            config.upstream.connect_timeout_secs = self.connect_timeout_secs;
        }
        if self.read_timeout_secs.is_some() {
            config.upstream.read_timeout_secs = self.read_timeout_secs;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;
    init_logging(&config.observability)?;

    tracing::info!("http-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        connect_timeout_secs = ?config.upstream.connect_timeout_secs,
        read_timeout_secs = ?config.upstream.read_timeout_secs,
        log_level = %config.observability.log_level,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_termination().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
