//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, validate, health), and their associated argument
//! structs. Every upstream and server flag has an environment variable
//! equivalent for container deployments.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_MAX_BODY_BYTES, DEFAULT_TARGET_BASE, DEFAULT_TIMEOUT_SECS};

#[derive(Parser)]
#[command(
    name = "cps-proxy",
    version,
    about = "Minimal HTTP forwarding proxy",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        cps-proxy run                                  Forward to https://weao.xyz on :8000\n  \
        cps-proxy run --target-base http://api:9000    Forward to another upstream\n  \
        API_KEY=s3cret cps-proxy run                   Require a key on /proxy routes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Validate the upstream configuration without starting
    Validate(ValidateArgs),

    /// Check health of a running instance
    Health(HealthArgs),
}

/// Settings that shape how requests are forwarded upstream.
#[derive(Args)]
pub struct UpstreamArgs {
    /// Upstream base URL every proxied path is appended to
    #[arg(long, env = "TARGET_BASE", default_value = DEFAULT_TARGET_BASE)]
    pub target_base: String,

    /// Shared secret required on /proxy routes (header X-API-Key or query api_key)
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Upstream timeout in seconds
    #[arg(
        long,
        env = "REQUEST_TIMEOUT",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        help_heading = "Tuning"
    )]
    pub timeout: f64,

    /// How upstream responses with status >= 400 are relayed
    #[arg(
        long,
        env = "UPSTREAM_ERRORS",
        default_value = "passthrough",
        help_heading = "Tuning"
    )]
    pub upstream_errors: UpstreamErrorPolicy,

    /// Largest upstream response body relayed, in bytes
    #[arg(
        long,
        env = "MAX_BODY_BYTES",
        default_value_t = DEFAULT_MAX_BODY_BYTES,
        help_heading = "Tuning"
    )]
    pub max_body_bytes: usize,
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        cps-proxy run                                  Defaults from the environment\n  \
        cps-proxy run -p 8080 --pretty                 Local dev mode\n  \
        cps-proxy run --upstream-errors reclassify     Turn upstream 4xx/5xx into proxy errors")]
pub struct RunArgs {
    #[command(flatten)]
    pub upstream: UpstreamArgs,

    /// Listen port
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,
}

#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub upstream: UpstreamArgs,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct HealthArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:8000")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Treatment of upstream responses whose status is 400 or above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamErrorPolicy {
    /// Relay status and body unchanged.
    #[default]
    Passthrough,
    /// Replace the body with a proxy error carrying the upstream status.
    Reclassify,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}
