use clap::Parser;
use std::path::PathBuf;
use workbench_config::{CacheBackend, CliOverrides, ConfigLoader};

mod commands;
mod context;
mod execute;

use commands::Commands;
use context::AppContext;

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "Inspect and drive the workbench file cache and execution outputs", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the XDG config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the persisted file cache
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Cache backend (memory, file)
    #[arg(long, global = true)]
    cache_backend: Option<CacheBackend>,

    /// Base URL of the workbench API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log level or filter directive (overridden by WORKBENCH_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let mut loader = ConfigLoader::new().overrides(CliOverrides {
        cache_dir: cli.cache_dir,
        cache_backend: cli.cache_backend,
        api_url: cli.api_url,
        log_level: cli.log_level,
    });
    if let Some(path) = cli.config {
        loader = loader.config_file(path);
    }
    let loaded = loader.load()?;

    workbench_utils::tracing::init(&loaded.config.log.level)
        .map_err(|e| eyre::eyre!("failed to initialise logging: {e}"))?;
    tracing::debug!(sources = ?loaded.sources, "configuration loaded");

    cli.command.execute(AppContext::new(loaded.config)).await
}
