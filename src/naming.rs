use crate::asset::Asset;
use crate::config::RevisionOptions;
use crate::path;

/// Chooses the revisioned file name of each asset.
pub struct FilenameAssigner<'a> {
    options: &'a RevisionOptions,
}

impl<'a> FilenameAssigner<'a> {
    pub fn new(options: &'a RevisionOptions) -> Self {
        Self { options }
    }

    /// New file name for `asset` given its final hash, ignoring exclusions.
    pub fn filename(&self, asset: &Asset, hash: &str) -> String {
        if let Some(transform) = &self.options.transform_filename {
            return transform(asset, hash);
        }
        let short = &hash[..self.options.hash_length.min(hash.len())];
        format!("{}.{}{}", asset.original_basename(), short, asset.original_extension())
    }

    /// Record the final hash and name on `asset`, moving its path unless renaming is excluded.
    pub fn assign(&self, asset: &mut Asset, hash: String) {
        if self.options.should_rename(asset) {
            let filename = self.filename(asset, &hash);
            asset.path = path::join_path(path::dirname(asset.original_path()), &filename);
            asset.final_relative_path =
                Some(format!("{}{}", path::dir_with_sep(asset.relative_path()), filename));
            asset.final_filename = Some(filename);
        } else {
            log::debug!("Not renaming {}", asset.relative_path());
            asset.final_filename = Some(asset.original_filename());
            asset.final_relative_path = Some(asset.relative_path().to_string());
        }
        asset.final_hash = Some(hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::AssetPool;
    use crate::rules::{RuleSet, RuleSpec};

    const HASH: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn frozen(rel: &str) -> Asset {
        let mut pool = AssetPool::new();
        pool.add(Asset::new(rel, "/site", b"x".to_vec(), false)).unwrap();
        pool.freeze();
        let asset = pool.iter().next().unwrap().clone();
        asset
    }

    #[test]
    fn test_default_scheme() {
        let options = RevisionOptions::default();
        let mut asset = frozen("css/style.css");
        FilenameAssigner::new(&options).assign(&mut asset, HASH.to_string());

        assert_eq!(asset.final_filename(), Some("style.01234567.css"));
        assert_eq!(asset.final_relative_path(), Some("css/style.01234567.css"));
        assert_eq!(asset.path(), "/site/css/style.01234567.css");
        assert_eq!(asset.final_hash(), Some(HASH));
    }

    #[test]
    fn test_hash_length_and_multi_dot_names() {
        let mut options = RevisionOptions::default();
        options.hash_length = 12;
        let mut asset = frozen("app.min.js");
        FilenameAssigner::new(&options).assign(&mut asset, HASH.to_string());
        assert_eq!(asset.final_filename(), Some("app.min.0123456789ab.js"));
        assert_eq!(asset.final_relative_path(), Some("app.min.0123456789ab.js"));
    }

    #[test]
    fn test_transform_filename() {
        let options = RevisionOptions::default().with_transform_filename(|asset, hash| {
            format!("{}-{}{}", &hash[..4], asset.original_basename(), asset.original_extension())
        });
        let mut asset = frozen("img/logo.png");
        FilenameAssigner::new(&options).assign(&mut asset, HASH.to_string());
        assert_eq!(asset.final_filename(), Some("0123-logo.png"));
        assert_eq!(asset.final_relative_path(), Some("img/0123-logo.png"));
    }

    #[test]
    fn test_rename_exclude_keeps_name_but_records_hash() {
        let mut options = RevisionOptions::default();
        options.rename_exclude = RuleSet::compile(&[RuleSpec::suffix(".html")]).unwrap();
        let mut asset = frozen("docs/index.html");
        FilenameAssigner::new(&options).assign(&mut asset, HASH.to_string());

        assert_eq!(asset.path(), "/site/docs/index.html");
        assert_eq!(asset.final_filename(), Some("index.html"));
        assert_eq!(asset.final_relative_path(), Some("docs/index.html"));
        assert_eq!(asset.final_hash(), Some(HASH));
    }

    #[test]
    fn test_global_exclude_keeps_favicon() {
        let options = RevisionOptions::default();
        let mut asset = frozen("favicon.ico");
        FilenameAssigner::new(&options).assign(&mut asset, HASH.to_string());
        assert_eq!(asset.final_filename(), Some("favicon.ico"));
    }
}
