//! Credential gate for every relayed route.
//!
//! Exactly one credential pair is configured per process. It is built once at
//! startup and shared read-only; handlers never see it.

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};

/// A username/password pair.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("credentials must have the form username:password")]
pub struct CredentialsError;

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse `username:password`, splitting on the first colon only.
    pub fn parse(pair: &str) -> Result<Self, CredentialsError> {
        pair.split_once(':')
            .map(|(user, pass)| Self::new(user, pass))
            .ok_or(CredentialsError)
    }

    /// Decode an `Authorization: Basic ...` header value.
    pub fn from_basic_header(value: &HeaderValue) -> Option<Self> {
        let value = value.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        Self::parse(&decoded).ok()
    }
}

/// Outcome of a credential check. Never says which field was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthResult {
    Authorized,
    Unauthorized,
}

/// Compares presented credentials against the configured pair.
#[derive(Debug)]
pub struct AuthGate {
    expected: Credentials,
}

impl AuthGate {
    pub fn new(expected: Credentials) -> Self {
        Self { expected }
    }

    pub fn verify(&self, presented: &Credentials) -> AuthResult {
        // Both fields are always compared so total time does not reveal
        // which one mismatched.
        let user_ok = constant_time_eq(
            presented.username.as_bytes(),
            self.expected.username.as_bytes(),
        );
        let pass_ok = constant_time_eq(
            presented.password.as_bytes(),
            self.expected.password.as_bytes(),
        );

        if user_ok & pass_ok {
            AuthResult::Authorized
        } else {
            AuthResult::Unauthorized
        }
    }
}

/// Byte comparison whose running time depends only on the longer input's
/// length, never on the position of the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = u8::from(a.len() != b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0
}

/// Uniform 401 returned for missing, garbled and wrong credentials alike.
pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"relay\"")],
        Json(serde_json::json!({ "detail": "Incorrect username or password" })),
    )
        .into_response()
}

/// Middleware that rejects any request without valid basic-auth credentials
/// before it reaches a handler.
pub async fn require_basic_auth(
    State(gate): State<Arc<AuthGate>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(Credentials::from_basic_header);

    match presented.map(|c| gate.verify(&c)) {
        Some(AuthResult::Authorized) => next.run(request).await,
        _ => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with missing or invalid credentials");
            unauthorized()
        }
    }
}
