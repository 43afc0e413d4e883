//! Integration tests for the HTTP server, informational endpoints, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use cps_proxy::config::ProxyConfig;
use cps_proxy::health::HealthResponse;
use cps_proxy::info::{RootResponse, TestResponse};
use cps_proxy::server::{self, AppState};

async fn start_test_server(config: ProxyConfig) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let router = server::build_router(Arc::new(AppState::new(config)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

// Nothing listens on port 1; the informational routes must not need it.
fn unreachable_config() -> ProxyConfig {
    ProxyConfig::new("http://127.0.0.1:1")
}

#[tokio::test]
async fn health_endpoint_returns_healthy() {
    let (addr, shutdown) = start_test_server(unreachable_config()).await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let health: HealthResponse = resp.json().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "CPS Network Proxy");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(health.upstream, "http://127.0.0.1:1");
    assert!(!health.auth_enabled);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn health_reports_auth_without_leaking_key() {
    let (addr, shutdown) = start_test_server(unreachable_config().with_api_key("hunter2")).await;

    let body = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!body.contains("hunter2"));

    let health: HealthResponse = serde_json::from_str(&body).unwrap();
    assert!(health.auth_enabled);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn root_lists_endpoints() {
    let (addr, shutdown) = start_test_server(unreachable_config()).await;

    let resp = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let root: RootResponse = resp.json().await.unwrap();
    assert_eq!(root.status, "ok");
    assert_eq!(root.message, "CPS Network Proxy is running");
    assert_eq!(root.endpoints.status, "/api/status/exploits");
    assert_eq!(root.endpoints.proxy, "/proxy/{path}");

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_endpoint_is_operational() {
    let (addr, shutdown) = start_test_server(unreachable_config()).await;

    let body: TestResponse = reqwest::get(format!("http://{addr}/test"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.status, "operational");
    assert_eq!(body.message, "Proxy is working correctly");
    assert!(body.timestamp > 1_600_000_000);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn unmatched_route_returns_404() {
    let (addr, shutdown) = start_test_server(unreachable_config()).await;

    let resp = reqwest::get(format!("http://{addr}/nonexistent")).await.unwrap();
    assert_eq!(resp.status(), 404);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn non_get_method_is_rejected() {
    let (addr, shutdown) = start_test_server(unreachable_config()).await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/proxy/anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 405);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn graceful_shutdown_works() {
    let (addr, shutdown) = start_test_server(unreachable_config()).await;

    let url = format!("http://{addr}/health");
    assert!(reqwest::get(&url).await.is_ok());

    let _ = shutdown.send(());

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let result = reqwest::get(&url).await;
    assert!(result.is_err());
}
