//! Watch source_dir for changes; rebuild the revisioned output automatically.

use clap::Parser;
use revall::watch::run_watcher;
use revall::{Config, RevisionOptions};
use std::path::PathBuf;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "watch")]
#[command(about = "Watch source_dir for changes and rebuild revisioned assets")]
struct Args {
    /// Debounce delay in milliseconds before rebuilding (overrides [watch].debounce_ms)
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Source directory (overrides [revall].source_dir)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output directory (overrides [revall].output_dir)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("RUST_LOG", config.revall.log_level.as_str()),
    )
    .init();

    if let Some(debounce_ms) = args.debounce_ms {
        config.watch.debounce_ms = debounce_ms;
    }
    if let Some(source) = args.source {
        config.revall.source_dir = source;
    }
    if let Some(output) = args.output {
        config.revall.output_dir = output;
    }
    config.validate_source()?;

    log::info!("Starting revall file watcher");
    log::info!("Source: {}", config.source_dir().display());
    log::info!("Output: {}", config.output_dir().display());
    log::info!("Debounce: {} ms", config.watch.debounce_ms);

    let options = RevisionOptions::from_config(&config.revision)?;

    log::info!("Watching for changes (Ctrl+C to stop)");
    run_watcher(config, options).await?;
    Ok(())
}
