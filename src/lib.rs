//! cps-proxy is a minimal HTTP forwarding proxy.
//!
//! It accepts `GET` requests, rebuilds the path and query against a fixed
//! upstream base URL, relays the request, and hands the upstream response
//! back as JSON or plain text with a permissive CORS header. An optional
//! shared-secret check gates the generic proxy route.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, health).
//! - [`config`] -- The immutable [`ProxyConfig`](config::ProxyConfig) and its
//!   validation.
//! - [`error`] -- Process-level and request-level error types using `thiserror`.
//! - [`guard`] -- The API key access guard and its axum middleware.
//! - [`health`] -- `GET /health` endpoint handler.
//! - [`info`] -- `GET /` and `GET /test` informational handlers.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Core forwarding: URL composition, the upstream call, and
//!   response shaping.
//! - [`server`] -- Axum router, shared application state, HTTP client, and
//!   graceful shutdown.

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod guard;
pub mod health;
pub mod info;
pub mod logging;
pub mod proxy;
pub mod server;
