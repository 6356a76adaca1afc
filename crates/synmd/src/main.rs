//! synmd - SynM Remote State Store daemon

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use synm_common::{StoreConfig, VERSION};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synmd")]
#[command(about = "SynM Remote State Store", version)]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Auto-generated key is "demo"
    #[arg(long)]
    demo: bool,

    /// Load the key from, and store a new key in, this file
    #[arg(long)]
    key_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StoreConfig::load_from_path(path)?,
        None => StoreConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if cli.demo {
        config.demo = true;
    }
    if let Some(path) = cli.key_file {
        config.key_file = Some(path);
    }

    info!("synmd v{} starting", VERSION);
    synmd::server::run(config).await
}
