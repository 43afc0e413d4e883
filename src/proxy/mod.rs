//! Core HTTP forwarding handlers.
//!
//! [`proxy_handler`] serves `GET /proxy/{path...}` behind the API key
//! guard, and [`exploits_status_handler`] serves the fixed
//! `GET /api/status/exploits` route without it. Both hand off to
//! [`forward::forward`]; submodules handle URL composition ([`target`]),
//! the upstream call ([`forward`]), and response shaping ([`response`]).

pub mod forward;
pub mod response;
pub mod target;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use crate::server::AppState;

pub const PROXY_PREFIX: &str = "/proxy/";
pub const EXPLOITS_STATUS_PATH: &str = "/api/status/exploits";

const CORRELATION_HEADER: &str = "x-correlation-id";
const EXPLOITS_CACHE_CONTROL: &str = "public, max-age=300";

pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    req_headers: HeaderMap,
) -> Response {
    // Raw (still percent-encoded) tail, so the upstream sees what the caller sent.
    let path = uri.path().strip_prefix(PROXY_PREFIX).unwrap_or_default();
    let query = uri.query().unwrap_or_default();
    relay(&state, &req_headers, path, query, None).await
}

pub async fn exploits_status_handler(
    State(state): State<Arc<AppState>>,
    req_headers: HeaderMap,
) -> Response {
    let mut response = relay(
        &state,
        &req_headers,
        EXPLOITS_STATUS_PATH,
        "",
        Some("application/json"),
    )
    .await;

    if response.status().is_success() {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static(EXPLOITS_CACHE_CONTROL),
        );
    }
    response
}

/// Forwarding routes are `GET` only; axum would otherwise answer `HEAD`
/// with the `GET` handler.
pub async fn head_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")])
}

async fn relay(
    state: &AppState,
    req_headers: &HeaderMap,
    path: &str,
    query: &str,
    accept: Option<&'static str>,
) -> Response {
    let correlation_id = req_headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    tracing::info!(
        correlation_id = %correlation_id,
        path = %path,
        query = %query,
        "request received"
    );

    let request = forward::ForwardRequest {
        client: &state.http_client,
        config: &state.config,
        path,
        query,
        accept,
        correlation_id: &correlation_id,
    };

    let mut response = match forward::forward(request).await {
        Ok(result) => result.into_response(),
        Err(e) => e.into_response(),
    };

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}
