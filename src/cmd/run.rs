//! `cps-proxy run` — start the proxy server.
//!
//! Validates the upstream configuration, initializes logging, and serves
//! the Axum router until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), ProxyError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = ProxyConfig::from_args(&args.upstream)?;
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    tracing::info!(
        addr = %addr,
        upstream = %config.target_base,
        timeout_secs = config.timeout.as_secs_f64(),
        upstream_errors = ?config.upstream_errors,
        auth_enabled = config.auth_enabled(),
        "cps-proxy starting"
    );

    let state = Arc::new(AppState::new(config));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("cps-proxy stopped");
    Ok(())
}
