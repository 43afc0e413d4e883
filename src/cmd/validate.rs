//! `cps-proxy validate` — check the upstream configuration without starting.
//!
//! Reads the same flags and environment variables as `run`, validates
//! them, and reports in either human-readable text or JSON.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::validation;
use crate::error::ProxyError;

pub fn execute(args: &ValidateArgs) -> Result<(), ProxyError> {
    let config = match validation::validate(&args.upstream) {
        Ok(config) => config,
        Err(errors) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} configuration has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => {
                    let json_errors: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "field": e.field,
                                "message": e.message,
                                "suggestion": e.suggestion,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "valid": false,
                            "errors": json_errors,
                        })
                    );
                }
            }
            return Err(ProxyError::ConfigValidation { errors });
        }
    };

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {}", validation::format_validation_report(&config));
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&serde_json::json!({
                    "valid": true,
                    "target_base": config.target_base,
                    "timeout_seconds": config.timeout.as_secs_f64(),
                    "upstream_errors": config.upstream_errors,
                    "max_body_bytes": config.max_body_bytes,
                    "auth_enabled": config.auth_enabled(),
                }))?
            );
        }
    }

    Ok(())
}
