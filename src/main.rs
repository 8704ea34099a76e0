use anyhow::Result;
use clap::Parser;
use revall::emit::{write_output, Descriptors};
use revall::ingest::{discover_assets, load_assets};
use revall::{Config, RevisionOptions, Revisioner};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "revall")]
#[command(about = "Revision static assets by content hash and rewrite the references between them")]
struct Args {
    /// Source directory (overrides [revall].source_dir)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Output directory (overrides [revall].output_dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of hash characters in revisioned file names
    #[arg(long)]
    hash_length: Option<usize>,

    /// URL prefix for root-anchored references and manifest values
    #[arg(long)]
    prefix: Option<String>,

    /// Write the manifest descriptor into the output directory
    #[arg(long)]
    manifest: bool,

    /// Write the version descriptor into the output directory
    #[arg(long)]
    version_file: bool,

    /// Print the manifest and write nothing
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.revall.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.revall.output_dir = output.clone();
        }
        if let Some(hash_length) = self.hash_length {
            config.revision.hash_length = hash_length;
        }
        if let Some(prefix) = &self.prefix {
            config.revision.prefix = prefix.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.revall.log_level.as_str())
    ).init();

    args.apply(&mut config);
    config.validate()?;
    config.validate_source()?;

    let start = Instant::now();
    log::info!("Starting revall v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Source: {}", config.source_dir().display());

    let entries = discover_assets(config.source_dir(), Some(config.output_dir()))?;
    if entries.is_empty() {
        log::warn!("No files found. Check source_dir in revall.toml.");
        return Ok(());
    }

    let options = RevisionOptions::from_config(&config.revision)?;
    let mut revisioner = Revisioner::new(options);
    load_assets(config.source_dir(), entries, &mut revisioner).await?;
    revisioner.run()?;

    if args.dry_run {
        println!("{}", revisioner.manifest_file()?.contents);
        return Ok(());
    }

    let descriptors = Descriptors { manifest: args.manifest, version: args.version_file };
    let written = write_output(&revisioner, config.output_dir(), descriptors).await?;

    log::info!("=== Revisioning Summary ===");
    log::info!("Assets: {}", revisioner.pool().len());
    log::info!("Files written: {} to {}", written, config.output_dir().display());
    log::info!("Version: {}", revisioner.combined_hash()?);
    log::info!("Elapsed: {:?}", start.elapsed());

    Ok(())
}
