//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`validate`], or [`health`]. Each handler
//! lives in its own submodule.

pub mod health;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::ProxyError;

pub async fn dispatch(cli: Cli) -> Result<(), ProxyError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Health(args)) => health::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  cps-proxy v{version} \u{2014} minimal HTTP forwarding proxy\n\n  \
         No command provided. To get started:\n\n    \
         cps-proxy run                          Start the proxy on :8000\n    \
         cps-proxy validate                     Check TARGET_BASE / API_KEY / timeout\n    \
         cps-proxy health                       Query a running instance\n    \
         cps-proxy --help                       See all commands and options\n"
    );
}
