//! Process-wide proxy configuration.
//!
//! [`ProxyConfig`] is built once at startup from CLI flags / environment
//! variables (see [`UpstreamArgs`]), validated by [`validation::validate`],
//! and shared read-only with every request handler through
//! [`AppState`](crate::server::AppState).

pub mod validation;

use std::time::Duration;

use crate::cli::{UpstreamArgs, UpstreamErrorPolicy};
use crate::error::ProxyError;

pub const DEFAULT_TARGET_BASE: &str = "https://weao.xyz";
pub const DEFAULT_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Sent as `User-Agent` on every upstream request.
pub const USER_AGENT: &str = "CPS-Network-Proxy/1.0";

#[derive(Clone)]
pub struct ProxyConfig {
    /// Upstream origin, without a trailing slash.
    pub target_base: String,
    /// Shared secret for `/proxy` routes. `None` disables the guard.
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub upstream_errors: UpstreamErrorPolicy,
    /// Largest upstream body collected before the call fails.
    pub max_body_bytes: usize,
}

impl ProxyConfig {
    /// Config with default timeout and policy, no API key.
    #[must_use]
    pub fn new(target_base: impl Into<String>) -> Self {
        Self {
            target_base: target_base.into(),
            api_key: None,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            upstream_errors: UpstreamErrorPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.api_key = (!key.is_empty()).then_some(key);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_upstream_errors(mut self, policy: UpstreamErrorPolicy) -> Self {
        self.upstream_errors = policy;
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn from_args(args: &UpstreamArgs) -> Result<Self, ProxyError> {
        validation::validate(args).map_err(|errors| ProxyError::ConfigValidation { errors })
    }

    #[must_use]
    pub const fn auth_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_BASE)
    }
}

// Hand-written so the secret never reaches logs.
impl std::fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("target_base", &self.target_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("upstream_errors", &self.upstream_errors)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
