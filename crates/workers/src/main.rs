use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tripwire_workers::config::{apply_env_overrides, load_from_file, WorkerConfig};

#[derive(Parser)]
#[command(name = "tripwire-worker", version, about = "Rule-driven topic notifier")]
struct Args {
    #[arg(long, short, env = "TRIPWIRE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading configuration");
            load_from_file(path)?
        }
        None => WorkerConfig::default(),
    };
    let config = apply_env_overrides(config)?;

    tripwire_workers::run::run(config).await
}
