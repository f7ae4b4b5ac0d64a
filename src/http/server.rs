//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, body limit, auth)
//! - Bind server to listener
//! - Stop accepting on shutdown signal and drain in-flight requests

use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::forward::Upstream;
use crate::http::handlers;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::security::auth::{require_basic_auth, AuthGate, Credentials, CredentialsError};

/// Error type for server construction.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid credentials: {0}")]
    Credentials(#[from] CredentialsError),
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Upstream,
    pub auth: Arc<AuthGate>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let credentials = Credentials::parse(&config.auth.credentials)?;
        if config.auth.credentials == crate::config::schema::DEFAULT_CREDENTIALS {
            tracing::warn!("Using the default credential pair; set auth.credentials or --auth");
        }

        let state = AppState {
            upstream: Upstream::from_config(&config.upstream)?,
            auth: Arc::new(AuthGate::new(credentials)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let protected = Router::new()
            .route("/get_response", get(handlers::get_response))
            .route(
                "/get_response_with_headers",
                get(handlers::get_response_with_headers),
            )
            .route("/get_response_raw", get(handlers::get_response_raw))
            .route("/filepart", get(handlers::filepart))
            .route("/file_size", get(handlers::file_size))
            .route("/post_response", post(handlers::post_response))
            .route_layer(middleware::from_fn_with_state(
                state.auth.clone(),
                require_basic_auth,
            ));

        Router::new()
            .route("/", get(handlers::root))
            .merge(protected)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_form_bytes))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Router with all layers, for in-process use (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            chunk_bytes = self.config.upstream.stream_chunk_bytes,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}
