//! Route handlers.
//!
//! Every handler except [`root`] runs behind the basic-auth middleware, parses
//! its parameters, calls exactly one forwarding operation and converts the
//! outcome with `response.rs`.

use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Form, Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::forward::{parse_target, whole::parse_header_json, PostArgs, UpstreamFailure};
use crate::http::request::request_id;
use crate::http::response::{
    envelope_response, range_response, raw_response, size_response, status_only,
};
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct UrlQuery {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct HeadersQuery {
    pub url: String,
    /// JSON object of header names to values.
    pub headers: String,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub url: String,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub url: String,
    /// JSON object with optional `data` and `headers`.
    pub args_json: String,
}

fn rejected(rejection: impl std::fmt::Display) -> UpstreamFailure {
    UpstreamFailure::malformed(format!("Invalid parameters: {rejection}"))
}

/// Liveness probe. No credentials required.
pub async fn root() -> impl IntoResponse {
    tracing::info!("GET /");
    (StatusCode::OK, Json(serde_json::json!({ "success": true })))
}

pub async fn get_response(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Response {
    let outcome = async {
        let Query(query) = query.map_err(rejected)?;
        let url = parse_target(&query.url)?;
        tracing::debug!(request_id = %request_id(&headers), url = %url, "get_response");
        state.upstream.forward_get(&url, HeaderMap::new()).await
    }
    .await;
    envelope_response(outcome)
}

pub async fn get_response_with_headers(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<HeadersQuery>, QueryRejection>,
) -> Response {
    let outcome = async {
        let Query(query) = query.map_err(rejected)?;
        let url = parse_target(&query.url)?;
        let extra = parse_header_json(&query.headers)?;
        tracing::debug!(request_id = %request_id(&headers), url = %url, "get_response_with_headers");
        state.upstream.forward_get(&url, extra).await
    }
    .await;
    envelope_response(outcome)
}

pub async fn post_response(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<PostForm>, FormRejection>,
) -> Response {
    let outcome = async {
        let Form(form) = form.map_err(rejected)?;
        let url = parse_target(&form.url)?;
        let args = PostArgs::parse(&form.args_json)?;
        tracing::debug!(request_id = %request_id(&headers), url = %url, "post_response");
        state.upstream.forward_post(&url, &args).await
    }
    .await;
    envelope_response(outcome)
}

pub async fn get_response_raw(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Response {
    let outcome = async {
        let Query(query) = query.map_err(rejected)?;
        let url = parse_target(&query.url)?;
        tracing::debug!(request_id = %request_id(&headers), url = %url, "get_response_raw");
        state.upstream.forward_raw(&url).await
    }
    .await;

    match outcome {
        Ok(reply) => raw_response(reply),
        Err(failure) => status_only(&failure),
    }
}

pub async fn filepart(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Response {
    let outcome = async {
        let Query(query) = query.map_err(rejected)?;
        let url = parse_target(&query.url)?;
        tracing::debug!(
            request_id = %request_id(&headers),
            url = %url,
            start = query.start,
            end = query.end,
            "filepart"
        );
        state.upstream.forward_range(&url, query.start, query.end).await
    }
    .await;

    match outcome {
        Ok(reply) => range_response(reply),
        Err(failure) => status_only(&failure),
    }
}

pub async fn file_size(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<UrlQuery>, QueryRejection>,
) -> Response {
    let outcome = async {
        let Query(query) = query.map_err(rejected)?;
        let url = parse_target(&query.url)?;
        tracing::debug!(request_id = %request_id(&headers), url = %url, "file_size");
        state.upstream.probe_size(&url).await
    }
    .await;

    match outcome {
        Ok(size) => size_response(size),
        Err(failure) => status_only(&failure),
    }
}
