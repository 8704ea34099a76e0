//! File watcher: rebuild the revisioned output whenever the source tree changes.
//!
//! Uses the notify crate to watch `source_dir`, debounces events, and for every
//! settled batch re-runs discovery, ingestion and the whole engine in a fresh
//! [`Revisioner`]. A single changed file can rename any of its dependents, so
//! nothing less than a full run is correct.

mod watcher;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::config::{Config, RevisionOptions};
use crate::emit::{write_output, Descriptors};
use crate::error::{Result, RevallError};
use crate::ingest::{discover_assets, load_assets};
use crate::revisioner::Revisioner;

/// Run the full pipeline from `source` into `output` with descriptors.
///
/// Returns the number of files written.
pub async fn rebuild(source: &Path, output: &Path, options: &RevisionOptions) -> Result<usize> {
    let start = std::time::Instant::now();

    let entries = discover_assets(source, Some(output))?;
    let mut revisioner = Revisioner::new(options.clone());
    load_assets(source, entries, &mut revisioner).await?;
    revisioner.run()?;

    let written = write_output(&revisioner, output, Descriptors { manifest: true, version: true }).await?;
    log::info!(
        "watch: rebuilt {} files in {:?} (version {})",
        written,
        start.elapsed(),
        revisioner.combined_hash()?
    );
    Ok(written)
}

/// Best-effort absolute form of `path` so it compares against notify's event paths.
fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    })
}

/// Run the file watcher: spawn watcher thread, then async loop that receives path
/// batches and rebuilds. Runs until the watcher thread exits.
pub async fn run_watcher(config: Config, options: RevisionOptions) -> Result<()> {
    let source = config.source_dir().to_path_buf();
    let output = config.output_dir().to_path_buf();
    let debounce_ms = config.watch.debounce_ms;

    if let Err(e) = rebuild(&source, &output, &options).await {
        log::error!("watch: initial build failed: {}", e);
    }

    let (tx, rx) = mpsc::channel();
    let rx = Arc::new(Mutex::new(rx));

    let watch_root = absolute(&source);
    let ignored = absolute(&output);
    std::thread::spawn(move || {
        let ignore = move |p: &Path| p.starts_with(&ignored);
        if let Err(e) = watcher::run_watcher_thread(&watch_root, debounce_ms, ignore, tx) {
            log::error!("watcher thread error: {}", e);
        }
    });

    loop {
        let rx_clone = rx.clone();
        let batch = tokio::task::spawn_blocking(move || {
            rx_clone.lock().unwrap_or_else(|e| e.into_inner()).recv()
        })
        .await
        .map_err(|e| RevallError::Watch(format!("watcher task join: {}", e)))?;

        let batch: Vec<PathBuf> = match batch {
            Ok(b) => b,
            Err(_) => break,
        };

        log::info!("watch: {} path(s) changed, rebuilding", batch.len());
        for p in &batch {
            log::debug!("watch: changed {}", p.display());
        }

        if let Err(e) = rebuild(&source, &output, &options).await {
            log::error!("watch rebuild: {}", e);
        }
    }
    Ok(())
}
