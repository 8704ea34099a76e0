//! The set of assets revisioned together in one run.

use std::collections::{BTreeMap, HashMap};

use crate::asset::{Asset, AssetId};
use crate::error::{Result, RevallError};
use crate::path;

/// All assets of one revisioning run, keyed by root-relative path.
///
/// The root (`base`) is the longest common directory prefix across every base
/// seen during ingestion. Once frozen the pool is ordered by relative path and
/// that order is the iteration order of every engine pass.
#[derive(Debug, Default)]
pub struct AssetPool {
    base: Option<String>,
    assets: Vec<Asset>,
    index: HashMap<String, AssetId>,
    frozen: bool,
    pub(crate) combined_hash: Option<String>,
    pub(crate) manifest: BTreeMap<String, String>,
}

impl AssetPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an asset, widening the pool root if its base lies elsewhere.
    pub fn add(&mut self, asset: Asset) -> Result<()> {
        if self.frozen {
            return Err(RevallError::PoolFrozen);
        }

        self.base = Some(match self.base.take() {
            None => asset.original_base().to_string(),
            Some(base) if asset.original_base().starts_with(&base) => base,
            Some(base) => {
                let widened = path::common_base(&base, asset.original_base());
                log::debug!("Pool root widened from {} to {}", base, widened);
                widened
            }
        });

        self.assets.push(asset);
        Ok(())
    }

    /// Stop ingestion: rebase every asset onto the pool root and order them.
    ///
    /// Calling this again on a frozen pool is a no-op.
    pub fn freeze(&mut self) {
        if self.frozen {
            return;
        }
        self.frozen = true;

        let base = self.base.clone().unwrap_or_else(|| "/".to_string());
        for asset in &mut self.assets {
            asset.base = base.clone();
            asset.relative_path = path::relative_path(&base, asset.original_path(), Some(false));
        }
        self.assets
            .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let mut unique: Vec<Asset> = Vec::with_capacity(self.assets.len());
        for asset in self.assets.drain(..) {
            if unique.last().map(|a| a.relative_path == asset.relative_path).unwrap_or(false) {
                log::warn!(
                    "Duplicate asset {} ignored, keeping the first one registered",
                    asset.original_path()
                );
                continue;
            }
            unique.push(asset);
        }
        self.assets = unique;

        self.index = self
            .assets
            .iter()
            .enumerate()
            .map(|(i, a)| (a.relative_path.clone(), AssetId(i)))
            .collect();
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Common root with a trailing slash, once any asset has been added.
    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = AssetId> {
        (0..self.assets.len()).map(AssetId)
    }

    pub fn get(&self, id: AssetId) -> &Asset {
        &self.assets[id.0]
    }

    pub fn get_mut(&mut self, id: AssetId) -> &mut Asset {
        &mut self.assets[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Asset> {
        self.assets.iter_mut()
    }

    /// Look up a frozen pool entry by its root-relative path (leading slash optional).
    pub fn find(&self, relative_path: &str) -> Option<AssetId> {
        self.index.get(relative_path.trim_start_matches('/')).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(path: &str, base: &str) -> Asset {
        Asset::new(path, base, b"x".to_vec(), false)
    }

    #[test]
    fn test_base_is_common_ancestor() {
        let mut pool = AssetPool::new();
        pool.add(asset("/p/dist/css/a.css", "/p/dist/css")).unwrap();
        assert_eq!(pool.base(), Some("/p/dist/css/"));
        pool.add(asset("/p/dist/js/a.js", "/p/dist/js")).unwrap();
        assert_eq!(pool.base(), Some("/p/dist/"));
        pool.add(asset("/p/dist/js/sub/b.js", "/p/dist/js/sub")).unwrap();
        assert_eq!(pool.base(), Some("/p/dist/"));
    }

    #[test]
    fn test_freeze_orders_and_indexes() {
        let mut pool = AssetPool::new();
        pool.add(asset("/site/js/app.js", "/site")).unwrap();
        pool.add(asset("/site/index.html", "/site")).unwrap();
        pool.add(asset("/site/css/style.css", "/site")).unwrap();
        pool.freeze();

        let order: Vec<_> = pool.iter().map(|a| a.relative_path().to_string()).collect();
        assert_eq!(order, vec!["css/style.css", "index.html", "js/app.js"]);
        assert_eq!(pool.find("/index.html"), Some(AssetId(1)));
        assert_eq!(pool.find("js/app.js"), Some(AssetId(2)));
        assert!(pool.find("missing.js").is_none());
        assert!(pool.iter().all(|a| a.base() == "/site/"));
    }

    #[test]
    fn test_add_after_freeze_fails() {
        let mut pool = AssetPool::new();
        pool.add(asset("/site/a.js", "/site")).unwrap();
        pool.freeze();
        let err = pool.add(asset("/site/b.js", "/site")).unwrap_err();
        assert!(matches!(err, RevallError::PoolFrozen));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let mut pool = AssetPool::new();
        pool.add(Asset::new("/site/a.js", "/site", b"first".to_vec(), false)).unwrap();
        pool.add(Asset::new("/site/a.js", "/site", b"second".to_vec(), false)).unwrap();
        pool.freeze();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(AssetId(0)).original_contents(), b"first");
    }
}
