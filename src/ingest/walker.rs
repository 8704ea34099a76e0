use walkdir::WalkDir;
use std::path::{Path, PathBuf};

use crate::error::{Result, RevallError};
use crate::path;

/// A file discovered under the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Forward-slash path relative to the source root
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Discover every file under `root`, sorted by relative path.
///
/// Links are followed. Anything below `exclude` (typically an output directory
/// nested inside the source tree) is skipped so revisioned output is never
/// revisioned again.
pub fn discover_assets(root: &Path, exclude: Option<&Path>) -> Result<Vec<AssetEntry>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| exclude.map_or(true, |x| !e.path().starts_with(x)))
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }

        let relative_path = file_path
            .strip_prefix(root)
            .map_err(|_| RevallError::InvalidInput(
                format!("Failed to compute relative path for: {}", file_path.display())
            ))?
            .to_string_lossy()
            .to_string();

        files.push(AssetEntry {
            relative_path: path::normalize(&relative_path),
            absolute_path: file_path.to_path_buf(),
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::info!("Discovered {} files in {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use std::fs;

    #[test]
    fn test_discover_assets() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("css")).unwrap();
        fs::create_dir_all(root.join("font")).unwrap();
        fs::write(root.join("index.html"), "<html></html>").unwrap();
        fs::write(root.join("css/style.css"), "body {}").unwrap();
        fs::write(root.join("font/font1 space.ttf"), b"\0\x01").unwrap();

        let files = discover_assets(root, None).unwrap();

        let names: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(names, vec!["css/style.css", "font/font1 space.ttf", "index.html"]);
        assert!(files[1].absolute_path.ends_with("font/font1 space.ttf"));
    }

    #[test]
    fn test_discover_assets_skips_excluded_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let out = root.join("build");

        fs::create_dir_all(&out).unwrap();
        fs::write(root.join("app.js"), "1").unwrap();
        fs::write(out.join("app.12345678.js"), "1").unwrap();

        let files = discover_assets(root, Some(&out)).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "app.js");
    }

    #[test]
    fn test_discover_assets_empty() {
        let temp_dir = TempDir::new().unwrap();
        let files = discover_assets(temp_dir.path(), None).unwrap();
        assert_eq!(files.len(), 0);
    }
}
