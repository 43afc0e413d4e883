//! Shared-secret access guard for the `/proxy` routes.
//!
//! [`check`] is the pure decision; [`require_api_key`] is the axum
//! middleware that feeds it the `X-API-Key` header and the `api_key`
//! query parameter and turns a denial into a 401. When no key is
//! configured every request passes through.

use std::borrow::Cow;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ForwardError;
use crate::server::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const API_KEY_PARAM: &str = "api_key";

/// Compare the presented key with the configured one. A non-empty header
/// wins over the query parameter. An unset or empty configured key disables
/// the guard.
#[must_use]
pub fn check(configured: Option<&str>, header_key: Option<&str>, query_key: Option<&str>) -> bool {
    match configured {
        None | Some("") => true,
        Some(expected) => presented_key(header_key, query_key) == Some(expected),
    }
}

fn presented_key<'a>(header_key: Option<&'a str>, query_key: Option<&'a str>) -> Option<&'a str> {
    header_key.filter(|key| !key.is_empty()).or(query_key)
}

/// First `api_key` value in a raw query string, form-decoded.
#[must_use]
pub fn query_api_key(query: Option<&str>) -> Option<Cow<'_, str>> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == API_KEY_PARAM)
        .map(|(_, value)| value)
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key.as_deref() else {
        return next.run(request).await;
    };

    let (allowed, header_present, query_present) = {
        let header_key = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        let query_key = query_api_key(request.uri().query());
        (
            check(Some(expected), header_key, query_key.as_deref()),
            header_key.is_some(),
            query_key.is_some(),
        )
    };

    if allowed {
        return next.run(request).await;
    }

    tracing::warn!(
        path = %request.uri().path(),
        header_present,
        query_present,
        "rejected request with invalid API key"
    );
    ForwardError::Unauthorized.into_response()
}
