//! Response shaping: content-type dispatch and the outbound response.
//!
//! An upstream body is classified as JSON or text purely from its
//! `Content-Type`. A body that claims JSON but fails to parse is relayed
//! as text rather than failing the request.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
}

/// `Json` iff the content type mentions `application/json`.
#[must_use]
pub fn classify(content_type: &str) -> BodyKind {
    if content_type
        .to_ascii_lowercase()
        .contains("application/json")
    {
        BodyKind::Json
    } else {
        BodyKind::Text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(serde_json::Value),
    Text(String),
}

impl UpstreamBody {
    #[must_use]
    pub fn decode(content_type: &str, body: &[u8]) -> Self {
        match classify(content_type) {
            BodyKind::Json => serde_json::from_slice(body).map_or_else(
                |e| {
                    tracing::debug!(error = %e, "upstream body is not valid JSON, relaying as text");
                    Self::text(body)
                },
                Self::Json,
            ),
            BodyKind::Text => Self::text(body),
        }
    }

    fn text(body: &[u8]) -> Self {
        Self::Text(String::from_utf8_lossy(body).into_owned())
    }

    #[must_use]
    pub const fn kind(&self) -> BodyKind {
        match self {
            Self::Json(_) => BodyKind::Json,
            Self::Text(_) => BodyKind::Text,
        }
    }
}

/// A received upstream response, ready to be relayed.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResult {
    pub status: StatusCode,
    pub body: UpstreamBody,
}

impl IntoResponse for UpstreamResult {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            UpstreamBody::Json(value) => (self.status, Json(value)).into_response(),
            UpstreamBody::Text(text) => (self.status, text).into_response(),
        };
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}
