//! Integration tests for the API key guard on `/proxy` routes.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use cps_proxy::config::ProxyConfig;
use cps_proxy::server::{self, AppState};

async fn serve(router: Router) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
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

struct Guarded {
    proxy: SocketAddr,
    upstream_hits: Arc<AtomicUsize>,
    _shutdowns: [tokio::sync::oneshot::Sender<()>; 2],
}

/// Proxy in front of an upstream that counts every request it sees.
async fn start(api_key: Option<&str>) -> Guarded {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let upstream = Router::new().fallback(move || {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            "upstream ok"
        }
    });
    let (upstream_addr, upstream_shutdown) = serve(upstream).await;

    let mut config = ProxyConfig::new(format!("http://{upstream_addr}"));
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }
    let (proxy, proxy_shutdown) = serve(server::build_router(Arc::new(AppState::new(config)))).await;

    Guarded {
        proxy,
        upstream_hits: hits,
        _shutdowns: [upstream_shutdown, proxy_shutdown],
    }
}

#[tokio::test]
async fn no_key_configured_lets_everything_through() {
    let env = start(None).await;
    let client = reqwest::Client::new();

    let plain = client
        .get(format!("http://{}/proxy/a", env.proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(plain.status(), 200);

    let with_junk = client
        .get(format!("http://{}/proxy/b?api_key=whatever", env.proxy))
        .header("x-api-key", "nonsense")
        .send()
        .await
        .unwrap();
    assert_eq!(with_junk.status(), 200);
    assert_eq!(with_junk.text().await.unwrap(), "upstream ok");

    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn header_key_is_accepted() {
    let env = start(Some("secret")).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/proxy/a", env.proxy))
        .header("X-API-Key", "secret")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn query_key_is_accepted() {
    let env = start(Some("secret")).await;

    let resp = reqwest::get(format!("http://{}/proxy/a?api_key=secret", env.proxy))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn wrong_header_is_rejected_before_upstream() {
    let env = start(Some("secret")).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/proxy/a", env.proxy))
        .header("X-API-Key", "wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Invalid API key");
    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wrong_header_wins_over_correct_query_key() {
    let env = start(Some("secret")).await;

    let resp = reqwest::Client::new()
        .get(format!("http://{}/proxy/a?api_key=secret", env.proxy))
        .header("X-API-Key", "wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_key_is_rejected() {
    let env = start(Some("secret")).await;

    let resp = reqwest::get(format!("http://{}/proxy/", env.proxy)).await.unwrap();
    assert_eq!(resp.status(), 401);
    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn info_routes_are_not_guarded() {
    let env = start(Some("secret")).await;

    for path in ["/", "/health", "/test"] {
        let resp = reqwest::get(format!("http://{}{path}", env.proxy)).await.unwrap();
        assert_eq!(resp.status(), 200, "{path}");
    }
    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn head_is_not_forwarded() {
    let env = start(None).await;
    let client = reqwest::Client::new();

    for path in ["/proxy/a", "/proxy/", "/api/status/exploits"] {
        let resp = client
            .head(format!("http://{}{path}", env.proxy))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 405, "{path}");
        assert_eq!(resp.headers()["allow"], "GET", "{path}");
    }
    assert_eq!(env.upstream_hits.load(Ordering::SeqCst), 0);
}
