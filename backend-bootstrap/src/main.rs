use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use backend_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "tradepost-backend")]
#[command(about = "Tradepost Backend Server", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppConfig::load(args.config).await?;
    let _log_guard = backend_bootstrap::telemetry::init(&config)?;

    backend_bootstrap::run_standalone(config).await
}
