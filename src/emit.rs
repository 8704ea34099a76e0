//! Writing a revisioned pool to an output directory.

use std::path::Path;

use crate::error::Result;
use crate::revisioner::Revisioner;

/// Which descriptor documents to write next to the assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Descriptors {
    pub manifest: bool,
    pub version: bool,
}

/// Write every asset at `out_dir/<final relative path>`, plus the requested descriptors.
///
/// Returns the number of files written.
pub async fn write_output(revisioner: &Revisioner, out_dir: &Path, descriptors: Descriptors) -> Result<usize> {
    // Fails before touching the disk when the pool has not been run
    revisioner.manifest()?;

    let mut written = 0;
    for asset in revisioner.assets() {
        let Some(relative) = asset.final_relative_path() else {
            continue;
        };
        write_file(&out_dir.join(relative), asset.contents()).await?;
        written += 1;
    }

    let options = revisioner.options();
    if descriptors.manifest {
        let manifest = revisioner.manifest_file()?;
        write_file(&out_dir.join(&options.manifest_file_name), manifest.contents.as_bytes()).await?;
        written += 1;
    }
    if descriptors.version {
        let version = revisioner.version_file()?;
        write_file(&out_dir.join(&options.version_file_name), version.contents.as_bytes()).await?;
        written += 1;
    }

    log::info!("Wrote {} files to {}", written, out_dir.display());
    Ok(written)
}

async fn write_file(target: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, contents).await?;
    log::debug!("Wrote {}", target.display());
    Ok(())
}
