//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks the upstream settings supplied on the
//! command line or through the environment and either returns a ready
//! [`ProxyConfig`] or every [`ValidationError`] found, each with an
//! optional suggestion.

use std::time::Duration;

use url::Url;

use super::ProxyConfig;
use crate::cli::UpstreamArgs;
use crate::error::ValidationError;

/// Validate the upstream base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_target_base(base: &str) -> Result<(), String> {
    if base.is_empty() {
        return Err("target base cannot be empty".into());
    }
    let parsed = Url::parse(base).map_err(|_| format!("'{base}' is not a valid URL"))?;
    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(format!(
            "unsupported scheme '{scheme}' (expected http or https)"
        ));
    }
    if parsed.host_str().is_none() {
        return Err(format!("'{base}' has no host"));
    }
    if base.ends_with('/') {
        return Err("target base must not end with '/'".into());
    }
    Ok(())
}

/// Convert a timeout in seconds. Must be finite and strictly positive.
pub fn validate_timeout(secs: f64) -> Result<Duration, String> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(format!("timeout must be a positive number of seconds, got {secs}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| format!("timeout {secs}s is out of range: {e}"))
}

pub fn validate(args: &UpstreamArgs) -> Result<ProxyConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(message) = validate_target_base(&args.target_base) {
        let trimmed = args.target_base.trim_end_matches('/');
        errors.push(ValidationError {
            field: "target_base".into(),
            message,
            suggestion: (args.target_base.ends_with('/') && !trimmed.is_empty())
                .then(|| format!("did you mean '{trimmed}'?")),
        });
    }

    let timeout = match validate_timeout(args.timeout) {
        Ok(timeout) => Some(timeout),
        Err(message) => {
            errors.push(ValidationError {
                field: "timeout".into(),
                message,
                suggestion: Some("the default is 10.0".into()),
            });
            None
        }
    };

    if args.max_body_bytes == 0 {
        errors.push(ValidationError {
            field: "max_body_bytes".into(),
            message: "body limit must be at least 1 byte".into(),
            suggestion: Some(format!("the default is {}", super::DEFAULT_MAX_BODY_BYTES)),
        });
    }

    match timeout {
        Some(timeout) if errors.is_empty() => {
            let mut config = ProxyConfig::new(args.target_base.clone())
                .with_timeout(timeout)
                .with_upstream_errors(args.upstream_errors)
                .with_max_body_bytes(args.max_body_bytes);
            if let Some(ref key) = args.api_key {
                config = config.with_api_key(key.clone());
            }
            Ok(config)
        }
        _ => Err(errors),
    }
}

#[must_use]
pub fn format_validation_report(config: &ProxyConfig) -> String {
    let auth = if config.auth_enabled() {
        "enabled (key redacted)"
    } else {
        "disabled"
    };
    [
        "configuration is valid".to_string(),
        format!("  upstream:        {}", config.target_base),
        format!("  timeout:         {:.1}s", config.timeout.as_secs_f64()),
        format!("  upstream errors: {:?}", config.upstream_errors).to_lowercase(),
        format!("  max body:        {} bytes", config.max_body_bytes),
        format!("  api key:         {auth}"),
    ]
    .join("\n")
}
