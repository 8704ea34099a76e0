//! Dependency-aware content hashing.
//!
//! An asset's final hash folds its original content hash with the final hash of
//! every asset it references, recursively. The walk is depth first with an
//! explicit stack of in-progress assets. When the walk runs into an asset that
//! is already on the stack, the cycle-closing edge contributes nothing. Every
//! asset finalized while that cycle start is still open, and whose hash read
//! through the cycle (directly or via another such asset), is scheduled to
//! absorb the cycle start's final hash once it is known.

use crate::asset::AssetId;
use crate::cache::HashCache;
use crate::classify::content_hash;
use crate::pool::AssetPool;

pub struct HashEngine<'a> {
    pool: &'a AssetPool,
    prefix: &'a str,
    cache: HashCache,
}

impl<'a> HashEngine<'a> {
    /// `prefix` is folded into the hash of assets holding root-anchored references.
    pub fn new(pool: &'a AssetPool, prefix: &'a str) -> Self {
        Self { pool, prefix, cache: HashCache::new(pool.len()) }
    }

    /// Hash every asset in pool order and return the hashes indexed by [`AssetId`].
    pub fn compute_all(mut self) -> Vec<String> {
        let mut stack = Vec::new();
        for id in self.pool.ids() {
            self.compute(id, &mut stack);
        }
        self.cache
            .into_hashes()
            .into_iter()
            .map(|h| h.unwrap_or_default())
            .collect()
    }

    pub fn compute(&mut self, id: AssetId, stack: &mut Vec<AssetId>) -> String {
        if let Some(done) = self.cache.get(id) {
            return done.to_string();
        }

        if let Some(pos) = stack.iter().position(|&s| s == id) {
            if pos + 1 < stack.len() {
                log::info!(
                    "Circular dependency detected: {} -> {}",
                    self.describe(&stack[pos..]),
                    self.pool.get(id).relative_path()
                );
            }
            return String::new();
        }

        let depth = stack.len();
        stack.push(id);

        let pool = self.pool;
        let asset = pool.get(id);
        let mut combined = asset.original_hash().to_string();
        // Lowest stack position of an open cycle start this hash was built without
        let mut open: Option<usize> = None;
        for target in asset.references().targets() {
            combined.push_str(&self.compute(target, stack));
            let reach = stack
                .iter()
                .position(|&s| s == target)
                .or_else(|| self.cache.pending(target));
            if let Some(pos) = reach.filter(|&pos| pos < depth) {
                open = Some(open.map_or(pos, |o| o.min(pos)));
            }
        }
        if !self.prefix.is_empty() && asset.references().has_absolute() {
            combined.push_str(self.prefix);
        }

        let hash = content_hash(combined.as_bytes());
        self.cache.set(id, hash.clone());

        let members = self.cache.take_obligations(id);
        match open {
            Some(pos) => {
                // Still inside an open cycle: this asset and everything waiting on it
                // absorb the cycle start's final hash instead.
                let start = stack[pos];
                self.cache.add_obligation(start, pos, std::iter::once(id).chain(members));
            }
            None => {
                for member in members {
                    let folded = match self.cache.get(member) {
                        Some(old) => content_hash(format!("{}{}", old, hash).as_bytes()),
                        None => continue,
                    };
                    log::debug!(
                        "Back-propagating hash of {} into {}",
                        asset.relative_path(),
                        pool.get(member).relative_path()
                    );
                    self.cache.set(member, folded);
                }
            }
        }

        stack.pop();
        hash
    }

    fn describe(&self, chain: &[AssetId]) -> String {
        chain
            .iter()
            .map(|&id| self.pool.get(id).relative_path())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Digest of every final hash concatenated in pool order.
pub fn combined_hash(hashes: &[String]) -> String {
    content_hash(hashes.concat().as_bytes())
}
