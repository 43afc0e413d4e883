//! `cps-proxy health` — check the health of a running instance.
//!
//! Sends a `GET /health` request to the specified URL and displays
//! the response as formatted text or raw JSON.

use std::time::Duration;

use crate::cli::HealthArgs;
use crate::error::{ForwardError, ProxyError};
use crate::health::HealthResponse;
use crate::proxy::forward::{fetch, FetchLimits};
use crate::server;

const HEALTH_LIMITS: FetchLimits = FetchLimits {
    timeout: Duration::from_secs(10),
    max_body_bytes: 64 * 1024,
};

pub async fn execute(args: HealthArgs) -> Result<(), ProxyError> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let client = server::build_http_client();

    let response = fetch(&client, &url, Some("application/json"), HEALTH_LIMITS)
        .await
        .map_err(|e| match e {
            ForwardError::Internal(message) => ProxyError::UriParse {
                source: message.into(),
            },
            other => ProxyError::HttpRequest {
                source: Box::new(other),
            },
        })?;

    if !response.status.is_success() {
        return Err(ProxyError::HealthCheckFailed(response.status));
    }

    let body = response.body;
    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let body_str = String::from_utf8_lossy(&body);
    match serde_json::from_str::<HealthResponse>(&body_str) {
        Ok(health) => {
            let uptime = format_uptime(health.uptime_seconds);
            let auth = if health.auth_enabled {
                "api key required"
            } else {
                "open"
            };
            println!("\u{2713} {} is {} ({})", health.service, health.status, args.url);
            println!("  version:   {}", health.version);
            println!("  uptime:    {uptime}");
            println!("  upstream:  {}", health.upstream);
            println!("  /proxy:    {auth}");
        }
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{body_str}");
        }
    }

    Ok(())
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
