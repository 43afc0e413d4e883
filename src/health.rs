//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] liveness payload. It never contacts the
//! upstream.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

pub const SERVICE_NAME: &str = "CPS Network Proxy";

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub upstream: String,
    pub auth_enabled: bool,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        upstream: state.config.target_base.clone(),
        auth_enabled: state.config.auth_enabled(),
    })
}
