use std::fmt;
use std::io::Read;

use crate::classify::content_hash;
use crate::path;
use crate::reference::ReferenceMap;

/// Stable handle of an asset inside one [`crate::pool::AssetPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub(crate) usize);

impl AssetId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Contents of an asset as handed over by the ingestion front-end.
pub enum AssetContents {
    /// Fully buffered bytes
    Buffer(Vec<u8>),
    /// An open stream; rejected, the engine needs every byte up front
    Stream(Box<dyn Read + Send>),
    /// No contents at all (directories); silently skipped
    Null,
}

impl fmt::Debug for AssetContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetContents::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
            AssetContents::Stream(_) => write!(f, "Stream"),
            AssetContents::Null => write!(f, "Null"),
        }
    }
}

impl From<Vec<u8>> for AssetContents {
    fn from(bytes: Vec<u8>) -> Self {
        AssetContents::Buffer(bytes)
    }
}

impl From<&str> for AssetContents {
    fn from(text: &str) -> Self {
        AssetContents::Buffer(text.as_bytes().to_vec())
    }
}

/// A single static asset being revisioned.
///
/// Everything prefixed `original_` is captured at ingestion and never changes;
/// it is the identity used for reference bookkeeping. `path` and `contents`
/// move as the pipeline renames and rewrites the file.
#[derive(Debug, Clone)]
pub struct Asset {
    pub(crate) path: String,
    pub(crate) base: String,
    original_path: String,
    original_base: String,
    original_extension: String,
    original_basename: String,
    original_contents: Vec<u8>,
    pub(crate) original_hash: String,
    pub(crate) contents: Vec<u8>,
    pub(crate) binary: bool,
    pub(crate) relative_path: String,
    pub(crate) references: ReferenceMap,
    pub(crate) final_hash: Option<String>,
    pub(crate) final_filename: Option<String>,
    pub(crate) final_relative_path: Option<String>,
}

impl Asset {
    /// Register a buffered file. Relative `path`s are taken relative to `base`.
    pub fn new(path: &str, base: &str, contents: Vec<u8>, binary: bool) -> Self {
        let base = path::with_trailing_sep(base);
        let normalized = path::normalize(path);
        let path = if normalized.starts_with('/') {
            normalized
        } else {
            path::join_path(&base, &normalized)
        };

        let original_extension = path::extname(&path).to_string();
        let original_basename = path::stem(&path).to_string();
        let original_hash = content_hash(&contents);

        Self {
            original_path: path.clone(),
            original_base: base.clone(),
            original_extension,
            original_basename,
            original_hash,
            contents: contents.clone(),
            original_contents: contents,
            binary,
            relative_path: String::new(),
            references: ReferenceMap::default(),
            final_hash: None,
            final_filename: None,
            final_relative_path: None,
            path,
            base,
        }
    }

    /// Current location, updated when the asset is renamed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pool root the asset is expressed against.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    /// Base directory supplied at ingestion.
    pub fn original_base(&self) -> &str {
        &self.original_base
    }

    /// Extension with its leading dot, e.g. `.js`.
    pub fn original_extension(&self) -> &str {
        &self.original_extension
    }

    /// File name without its extension.
    pub fn original_basename(&self) -> &str {
        &self.original_basename
    }

    /// Original file name (`basename` + `extension`).
    pub fn original_filename(&self) -> String {
        format!("{}{}", self.original_basename, self.original_extension)
    }

    pub fn original_contents(&self) -> &[u8] {
        &self.original_contents
    }

    pub fn original_hash(&self) -> &str {
        &self.original_hash
    }

    /// Contents after reference rewriting (the original bytes before a run).
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Root-relative original path without a leading slash.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Root-relative original path with a leading slash, as rules see it.
    pub fn rooted_path(&self) -> String {
        format!("/{}", self.relative_path)
    }

    pub fn references(&self) -> &ReferenceMap {
        &self.references
    }

    pub fn final_hash(&self) -> Option<&str> {
        self.final_hash.as_deref()
    }

    pub fn final_filename(&self) -> Option<&str> {
        self.final_filename.as_deref()
    }

    /// Root-relative final path without a leading slash.
    pub fn final_relative_path(&self) -> Option<&str> {
        self.final_relative_path.as_deref()
    }

    /// Drop everything a previous run computed.
    pub(crate) fn reset(&mut self) {
        self.path = self.original_path.clone();
        self.contents = self.original_contents.clone();
        self.references = ReferenceMap::default();
        self.final_hash = None;
        self.final_filename = None;
        self.final_relative_path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_original_snapshot() {
        let asset = Asset::new("/project/dist/js/app.js.map", "/project/dist", b"{}".to_vec(), false);
        assert_eq!(asset.original_path(), "/project/dist/js/app.js.map");
        assert_eq!(asset.original_base(), "/project/dist/");
        assert_eq!(asset.original_extension(), ".map");
        assert_eq!(asset.original_basename(), "app.js");
        assert_eq!(asset.original_filename(), "app.js.map");
        assert_eq!(asset.original_hash().len(), 64);
    }

    #[test]
    fn test_asset_relative_path_joined_with_base() {
        let asset = Asset::new("css\\style.css", "c:\\site\\", Vec::new(), false);
        assert_eq!(asset.path(), "/site/css/style.css");
        assert_eq!(asset.base(), "/site/");
    }

    #[test]
    fn test_reset_restores_original() {
        let mut asset = Asset::new("/a/b.css", "/a", b"x".to_vec(), false);
        asset.path = "/a/b.1234.css".to_string();
        asset.contents = b"y".to_vec();
        asset.final_hash = Some("1234".to_string());
        asset.reset();
        assert_eq!(asset.path(), "/a/b.css");
        assert_eq!(asset.contents(), b"x");
        assert!(asset.final_hash().is_none());
    }

    #[test]
    fn test_contents_debug() {
        assert_eq!(format!("{:?}", AssetContents::from("abc")), "Buffer(3 bytes)");
        assert_eq!(format!("{:?}", AssetContents::Null), "Null");
    }
}
