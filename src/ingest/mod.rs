//! Feeding a source tree into a [`Revisioner`].
//!
//! Reading files is the only place the pipeline waits on I/O; every engine pass
//! runs afterwards on fully buffered contents.

pub mod walker;

pub use walker::{discover_assets, AssetEntry};

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::error::{Result, RevallError};
use crate::path;
use crate::revisioner::Revisioner;

/// Absolute forward-slash form of `root`, used as the base of every asset.
pub fn source_base(root: &Path) -> Result<String> {
    let absolute: PathBuf = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()?.join(root)
    };
    Ok(path::with_trailing_sep(&absolute.to_string_lossy()))
}

/// Read every entry concurrently and register it with `revisioner` in path order.
///
/// Unreadable files are logged and skipped. Returns the number of assets added.
pub async fn load_assets(
    root: &Path,
    entries: Vec<AssetEntry>,
    revisioner: &mut Revisioner,
) -> Result<usize> {
    let base = source_base(root)?;

    let mut reads = JoinSet::new();
    for entry in entries {
        reads.spawn(async move {
            let bytes = tokio::fs::read(&entry.absolute_path).await;
            (entry, bytes)
        });
    }

    let mut loaded = Vec::new();
    while let Some(joined) = reads.join_next().await {
        let (entry, bytes) = joined
            .map_err(|e| RevallError::InvalidInput(format!("read task join: {}", e)))?;
        match bytes {
            Ok(bytes) => loaded.push((entry, bytes)),
            Err(e) => log::warn!("Skipping unreadable {}: {}", entry.absolute_path.display(), e),
        }
    }

    loaded.sort_by(|a, b| a.0.relative_path.cmp(&b.0.relative_path));
    let count = loaded.len();
    for (entry, bytes) in loaded {
        revisioner.add(&entry.relative_path, &base, bytes)?;
    }

    log::info!("Loaded {} assets from {}", count, root.display());
    Ok(count)
}
