//! Informational endpoints: `GET /` and `GET /test`.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::health::SERVICE_NAME;
use crate::proxy::EXPLOITS_STATUS_PATH;

#[derive(Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub version: String,
    pub commit: String,
    pub endpoints: Endpoints,
}

#[derive(Serialize, Deserialize)]
pub struct Endpoints {
    pub status: String,
    pub proxy: String,
}

#[derive(Serialize, Deserialize)]
pub struct TestResponse {
    pub message: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub status: String,
}

pub async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        message: format!("{SERVICE_NAME} is running"),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("CPS_PROXY_GIT_SHORT").to_string(),
        endpoints: Endpoints {
            status: EXPLOITS_STATUS_PATH.to_string(),
            proxy: "/proxy/{path}".to_string(),
        },
    })
}

pub async fn test_handler() -> Json<TestResponse> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());

    Json(TestResponse {
        message: "Proxy is working correctly".to_string(),
        timestamp,
        status: "operational".to_string(),
    })
}
