//! The upstream call: one `GET`, bounded by the configured timeout.
//!
//! [`forward`] composes the target URL, performs the request through the
//! shared hyper client, applies the [`UpstreamErrorPolicy`], and decodes
//! the body into an [`UpstreamResult`]. There are no retries.

use std::time::{Duration, Instant};

use axum::http::{header, Method, StatusCode};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};

use super::response::{UpstreamBody, UpstreamResult};
use super::target::build_target_url;
use crate::cli::UpstreamErrorPolicy;
use crate::config::{ProxyConfig, USER_AGENT};
use crate::error::ForwardError;
use crate::server::HttpClient;

pub struct ForwardRequest<'a> {
    pub client: &'a HttpClient,
    pub config: &'a ProxyConfig,
    /// Inbound path tail, with or without a leading `/`.
    pub path: &'a str,
    /// Raw inbound query string, without the `?`.
    pub query: &'a str,
    /// Optional `Accept` header for the upstream request.
    pub accept: Option<&'static str>,
    pub correlation_id: &'a str,
}

/// Status, content type and collected body of an upstream reply.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: Bytes,
}

#[allow(clippy::cast_possible_truncation)]
pub async fn forward(req: ForwardRequest<'_>) -> Result<UpstreamResult, ForwardError> {
    let target = build_target_url(&req.config.target_base, req.path, req.query);
    let start = Instant::now();

    let limits = FetchLimits {
        timeout: req.config.timeout,
        max_body_bytes: req.config.max_body_bytes,
    };
    let raw = match fetch(req.client, &target, req.accept, limits).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                correlation_id = %req.correlation_id,
                target = %target,
                error = %e,
                latency_ms = start.elapsed().as_millis() as u64,
                "upstream request failed"
            );
            return Err(e);
        }
    };

    tracing::info!(
        correlation_id = %req.correlation_id,
        target = %target,
        status = raw.status.as_u16(),
        bytes = raw.body.len(),
        latency_ms = start.elapsed().as_millis() as u64,
        "upstream responded"
    );

    apply_policy(req.config.upstream_errors, raw)
}

/// Reclassify an error status or decode the body for relay.
pub fn apply_policy(
    policy: UpstreamErrorPolicy,
    raw: RawResponse,
) -> Result<UpstreamResult, ForwardError> {
    if policy == UpstreamErrorPolicy::Reclassify
        && (raw.status.is_client_error() || raw.status.is_server_error())
    {
        return Err(ForwardError::UpstreamStatus(raw.status));
    }

    Ok(UpstreamResult {
        status: raw.status,
        body: UpstreamBody::decode(&raw.content_type, &raw.body),
    })
}

/// Bounds on a single upstream exchange.
#[derive(Debug, Clone, Copy)]
pub struct FetchLimits {
    /// Covers connect, response head and body collection together.
    pub timeout: Duration,
    pub max_body_bytes: usize,
}

/// Issue the request and collect the whole body within the limits.
pub async fn fetch(
    client: &HttpClient,
    url: &str,
    accept: Option<&'static str>,
    limits: FetchLimits,
) -> Result<RawResponse, ForwardError> {
    let FetchLimits {
        timeout,
        max_body_bytes,
    } = limits;
    let uri: hyper::Uri = url
        .parse()
        .map_err(|e| ForwardError::Internal(format!("invalid upstream URL '{url}': {e}")))?;

    let mut builder = hyper::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::USER_AGENT, USER_AGENT);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    let request = builder
        .body(Full::new(Bytes::new()))
        .map_err(|e| ForwardError::Internal(e.to_string()))?;

    let exchange = async {
        let response = client
            .request(request)
            .await
            .map_err(|e| ForwardError::Transport(error_chain(&e)))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = Limited::new(response.into_body(), max_body_bytes)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    ForwardError::Transport(format!(
                        "upstream body exceeds {max_body_bytes} bytes"
                    ))
                } else {
                    ForwardError::Transport(format!("body read error: {}", error_chain(&*e)))
                }
            })?
            .to_bytes();

        Ok::<_, ForwardError>(RawResponse {
            status,
            content_type,
            body,
        })
    };

    tokio::time::timeout(timeout, exchange).await.map_err(|_| {
        ForwardError::Transport(format!(
            "request timed out after {}s",
            timeout.as_secs_f64()
        ))
    })?
}

/// hyper-util reports `client error (Connect)` at the top level; the cause
/// (`Connection refused`, DNS failure) lives further down the chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
