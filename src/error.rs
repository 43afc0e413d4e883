//! Unified error types for cps-proxy.
//!
//! [`ProxyError`] covers process-level failures (bad configuration,
//! binding, the `health` subcommand client) and is reported by `main`.
//! [`ForwardError`] covers a single proxied request and renders itself
//! as a JSON `{"detail": ...}` response with the matching status code.
//! Both use `thiserror` for `Display` and `Error` derives.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProxyError {
    #[error("Config validation failed:\n{}", format_errors(.errors))]
    ConfigValidation { errors: Vec<ValidationError> },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(StatusCode),

    #[error("Failed to encode output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure of a single forwarded request.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// Guard enabled and the caller's key is missing or wrong.
    #[error("Invalid API key")]
    Unauthorized,

    /// DNS, connect, TLS, read failure or timeout talking to the upstream.
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// Upstream answered >= 400 under the reclassify policy.
    #[error("Upstream error: {}", .0.as_u16())]
    UpstreamStatus(StatusCode),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ForwardError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamStatus(status) => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ForwardError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response();
        response.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}
