//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared, read-only state holding the
//! proxy config, HTTP client, and start time), [`build_router`] for the
//! route table and middleware layers, [`build_http_client`] for the
//! hyper client used upstream, and [`shutdown_signal`] for SIGTERM /
//! Ctrl+C handling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::handler::Handler;
use axum::middleware;
use axum::routing::{get, MethodRouter};
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::health::health_handler;
use crate::{guard, info, proxy};

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub config: ProxyConfig,
    pub http_client: HttpClient,
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            http_client: build_http_client(),
            start_time: Instant::now(),
        }
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // With more than one rustls crypto provider compiled in, rustls cannot
    // pick one on its own. Install `ring` explicitly.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// Browser preflight handling. Any origin, method and header; never credentials,
/// which a wildcard origin cannot carry.
#[must_use]
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let proxied = Router::new()
        .route("/proxy/", forwarding(proxy::proxy_handler))
        .route("/proxy/{*path}", forwarding(proxy::proxy_handler))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            guard::require_api_key,
        ));

    Router::new()
        .route("/", get(info::root_handler))
        .route("/health", get(health_handler))
        .route("/test", get(info::test_handler))
        .route(
            proxy::EXPLOITS_STATUS_PATH,
            forwarding(proxy::exploits_status_handler),
        )
        .merge(proxied)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// `GET` only; `HEAD` gets a 405 instead of falling back to the `GET` handler.
fn forwarding<H, T>(handler: H) -> MethodRouter<Arc<AppState>>
where
    H: Handler<T, Arc<AppState>>,
    T: 'static,
{
    get(handler).head(proxy::head_not_allowed)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
