use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = cps_proxy::cli::Cli::parse();
    if let Err(e) = cps_proxy::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
