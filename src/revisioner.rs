//! The revisioning pipeline over one pool of assets.
//!
//! Assets are added while ingesting; [`Revisioner::run`] then freezes the pool
//! and performs, strictly one phase after the other over the whole pool:
//! reference resolution, hashing and renaming, and reference rewriting.
//! `run` may be called again, for example after overriding an original hash,
//! and recomputes everything from the original snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::asset::{Asset, AssetContents, AssetId};
use crate::cache::PatternCache;
use crate::config::RevisionOptions;
use crate::error::{Result, RevallError};
use crate::hash::{combined_hash, HashEngine};
use crate::naming::FilenameAssigner;
use crate::path;
use crate::pool::AssetPool;
use crate::reference::ReferenceResolver;
use crate::rewrite::ReferenceRewriter;

/// Where a [`Revisioner`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Empty,
    Ingesting,
    Resolved,
    Renamed,
    Rewritten,
}

/// A generated descriptor document and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorFile {
    pub path: String,
    pub contents: String,
}

#[derive(Serialize)]
struct VersionDescriptor<'a> {
    hash: &'a str,
    timestamp: String,
}

pub struct Revisioner {
    options: RevisionOptions,
    pool: AssetPool,
    patterns: PatternCache,
    state: RunState,
}

impl Revisioner {
    pub fn new(options: RevisionOptions) -> Self {
        let patterns = PatternCache::new(options.pattern_cache_capacity);
        Self {
            options,
            pool: AssetPool::new(),
            patterns,
            state: RunState::Empty,
        }
    }

    pub fn options(&self) -> &RevisionOptions {
        &self.options
    }

    /// Options used by the next [`run`](Self::run).
    pub fn options_mut(&mut self) -> &mut RevisionOptions {
        &mut self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Register one asset.
    ///
    /// `Null` contents are skipped, streamed contents are rejected, and nothing
    /// can be added once the pool has been run.
    pub fn add(&mut self, path: &str, base: &str, contents: impl Into<AssetContents>) -> Result<()> {
        let bytes = match contents.into() {
            AssetContents::Buffer(bytes) => bytes,
            AssetContents::Null => {
                log::debug!("Skipping {} without contents", path);
                return Ok(());
            }
            AssetContents::Stream(_) => {
                return Err(RevallError::UnsupportedInput(format!(
                    "{}: streamed contents are not supported, buffer the file first",
                    path
                )));
            }
        };

        let binary = (self.options.binary_predicate)(&bytes);
        self.pool.add(Asset::new(path, base, bytes, binary))?;
        self.state = RunState::Ingesting;
        Ok(())
    }

    /// Run every phase over the whole pool.
    pub fn run(&mut self) -> Result<()> {
        self.pool.freeze();
        for asset in self.pool.iter_mut() {
            asset.reset();
        }
        self.pool.manifest.clear();
        self.pool.combined_hash = None;
        self.state = if self.pool.is_empty() { RunState::Empty } else { RunState::Ingesting };

        self.resolve_references()?;
        self.state = RunState::Resolved;

        self.assign_hashes();
        self.state = RunState::Renamed;

        self.rewrite_references();
        self.state = RunState::Rewritten;

        log::info!(
            "Revisioned {} assets under {}",
            self.pool.len(),
            self.pool.base().unwrap_or("/")
        );
        Ok(())
    }

    fn resolve_references(&mut self) -> Result<()> {
        let resolver = ReferenceResolver::new(&self.options, &self.patterns);
        let maps = self
            .pool
            .ids()
            .map(|id| resolver.resolve(&self.pool, id))
            .collect::<Result<Vec<_>>>()?;

        for (asset, map) in self.pool.iter_mut().zip(maps) {
            asset.references = map;
        }
        Ok(())
    }

    fn assign_hashes(&mut self) {
        let hashes = HashEngine::new(&self.pool, &self.options.prefix).compute_all();
        self.pool.combined_hash = Some(combined_hash(&hashes));

        let assigner = FilenameAssigner::new(&self.options);
        let prefix = self.options.prefix.as_str();
        let mut manifest = BTreeMap::new();
        for (asset, hash) in self.pool.iter_mut().zip(hashes) {
            assigner.assign(asset, hash);
            let final_relative = asset.final_relative_path().unwrap_or_default();
            let value = if prefix.is_empty() {
                final_relative.to_string()
            } else {
                path::join_url(prefix, final_relative)
            };
            manifest.insert(asset.relative_path().to_string(), value);
        }
        self.pool.manifest = manifest;
    }

    fn rewrite_references(&mut self) {
        let rewriter = ReferenceRewriter::new(&self.options);
        let rewritten: Vec<(AssetId, Vec<u8>)> = self
            .pool
            .ids()
            .filter_map(|id| rewriter.rewrite(&self.pool, id).map(|c| (id, c)))
            .collect();

        for (id, contents) in rewritten {
            self.pool.get_mut(id).contents = contents;
        }
    }

    fn ensure_revisioned(&self) -> Result<()> {
        if self.state == RunState::Rewritten {
            Ok(())
        } else {
            Err(RevallError::NotRevisioned)
        }
    }

    /// Original root-relative path to final (optionally prefixed) path.
    pub fn manifest(&self) -> Result<&BTreeMap<String, String>> {
        self.ensure_revisioned()?;
        Ok(&self.pool.manifest)
    }

    /// Digest of every final hash in pool order.
    pub fn combined_hash(&self) -> Result<&str> {
        self.ensure_revisioned()?;
        self.pool.combined_hash.as_deref().ok_or(RevallError::NotRevisioned)
    }

    pub fn manifest_file(&self) -> Result<DescriptorFile> {
        let manifest = self.manifest()?;
        Ok(DescriptorFile {
            path: self.descriptor_path(&self.options.manifest_file_name),
            contents: serde_json::to_string_pretty(manifest)?,
        })
    }

    pub fn version_file(&self) -> Result<DescriptorFile> {
        let descriptor = VersionDescriptor {
            hash: self.combined_hash()?,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        Ok(DescriptorFile {
            path: self.descriptor_path(&self.options.version_file_name),
            contents: serde_json::to_string_pretty(&descriptor)?,
        })
    }

    fn descriptor_path(&self, name: &str) -> String {
        path::join_path(self.pool.base().unwrap_or("/"), name)
    }

    /// Pretend the asset at `relative_path` was ingested with a different content hash.
    ///
    /// Only meaningful once the pool has been run; takes effect on the next run.
    pub fn override_original_hash(&mut self, relative_path: &str, hash: impl Into<String>) -> Result<()> {
        let id = self.pool.find(relative_path).ok_or_else(|| {
            RevallError::InvalidInput(format!("No asset registered at {}", relative_path))
        })?;
        self.pool.get_mut(id).original_hash = hash.into();
        Ok(())
    }

    pub fn pool(&self) -> &AssetPool {
        &self.pool
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.pool.iter()
    }

    /// Asset by its original root-relative path, once the pool is frozen.
    pub fn asset(&self, relative_path: &str) -> Option<&Asset> {
        self.pool.find(relative_path).map(|id| self.pool.get(id))
    }
}
