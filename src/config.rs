use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::asset::Asset;
use crate::classify::{default_binary_predicate, BinaryPredicate};
use crate::reference::{BoundaryPattern, Spelling};
use crate::rewrite::Fragment;
use crate::rules::{default_global_exclude, RuleSet, RuleSpec};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub revall: RevallConfig,
    #[serde(default)]
    pub revision: RevisionConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Where assets come from and where revisioned output goes
#[derive(Debug, Clone, Deserialize)]
pub struct RevallConfig {
    /// Root directory holding the assets to revision.
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for RevallConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Revisioning engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionConfig {
    #[serde(default = "default_hash_length")]
    pub hash_length: usize,
    /// URL prefix joined onto root-anchored reference replacements
    #[serde(default)]
    pub prefix: String,
    /// Never renamed, never searched, never a reference target
    #[serde(default = "default_global_exclude")]
    pub global_exclude: Vec<RuleSpec>,
    #[serde(default)]
    pub rename_exclude: Vec<RuleSpec>,
    #[serde(default)]
    pub search_exclude: Vec<RuleSpec>,
    #[serde(default)]
    pub reference_update_exclude: Vec<RuleSpec>,
    #[serde(default = "default_manifest_file_name")]
    pub manifest_file_name: String,
    #[serde(default = "default_version_file_name")]
    pub version_file_name: String,
    #[serde(default = "default_pattern_cache_capacity")]
    pub pattern_cache_capacity: usize,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            hash_length: default_hash_length(),
            prefix: String::new(),
            global_exclude: default_global_exclude(),
            rename_exclude: Vec::new(),
            search_exclude: Vec::new(),
            reference_update_exclude: Vec::new(),
            manifest_file_name: default_manifest_file_name(),
            version_file_name: default_version_file_name(),
            pattern_cache_capacity: default_pattern_cache_capacity(),
        }
    }
}

/// Watch mode configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_hash_length() -> usize {
    8
}

fn default_manifest_file_name() -> String {
    "rev-manifest.json".to_string()
}

fn default_version_file_name() -> String {
    "rev-version.json".to_string()
}

fn default_pattern_cache_capacity() -> usize {
    4096
}

fn default_debounce_ms() -> u64 {
    500
}

/// Longest usable hash prefix (hex length of a SHA256 digest).
pub const MAX_HASH_LENGTH: usize = 64;

/// Default config file looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "revall.toml";

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in REVALL_CONFIG environment variable (must exist)
    /// 2. ./revall.toml in current directory (optional, defaults otherwise)
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var("REVALL_CONFIG") {
            Ok(path) => Self::load_from(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load_from(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => {
                log::debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                Config::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a specific config file without validating it
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let hash_length = self.revision.hash_length;
        if hash_length == 0 || hash_length > MAX_HASH_LENGTH {
            anyhow::bail!(
                "revision.hash_length must be between 1 and {}, got {}",
                MAX_HASH_LENGTH,
                hash_length
            );
        }

        if self.revision.pattern_cache_capacity == 0 {
            anyhow::bail!("revision.pattern_cache_capacity must be greater than 0");
        }

        if self.revision.manifest_file_name.trim().is_empty()
            || self.revision.version_file_name.trim().is_empty()
        {
            anyhow::bail!("revision.manifest_file_name and revision.version_file_name must not be empty");
        }

        // Surfaces bad regular expressions at load time instead of mid-run
        RevisionOptions::from_config(&self.revision)
            .context("Invalid exclusion rule in [revision]")?;

        Ok(())
    }

    /// Check that the source directory is usable
    pub fn validate_source(&self) -> Result<()> {
        let source = &self.revall.source_dir;
        if !source.exists() {
            anyhow::bail!(
                "source_dir path does not exist: {}. Set source_dir in revall.toml or pass --source.",
                source.display()
            );
        }

        if !source.is_dir() {
            anyhow::bail!("source_dir must be a directory, not a file: {}", source.display());
        }

        Ok(())
    }

    pub fn source_dir(&self) -> &Path {
        &self.revall.source_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.revall.output_dir
    }
}

/// Replaces the default `{basename}.{hash}{ext}` naming; gets the asset and its full hash.
pub type TransformFilename = Arc<dyn Fn(&Asset, &str) -> String + Send + Sync>;

/// Replaces a computed reference path; gets `(new_path, original_spelling, target, context)`.
pub type TransformPath = Arc<dyn Fn(&str, &str, &Asset, &Asset) -> String + Send + Sync>;

/// Splits an asset's original contents into fragments before rewriting.
///
/// Fragments are joined back in order; those marked `skip` are left as they are.
pub type Annotator = Arc<dyn Fn(&[u8], &Asset) -> Vec<Fragment> + Send + Sync>;

/// Applies one replacement to one fragment; gets `(fragment, pattern, replacement, target)`.
pub type Replacer = Arc<dyn Fn(&mut Fragment, &BoundaryPattern, &str, &Asset) + Send + Sync>;

/// Builds the patterns that detect a spelling in place of the built-in boundaries.
pub type ReferencePatterns =
    Arc<dyn Fn(&Spelling) -> crate::error::Result<Vec<BoundaryPattern>> + Send + Sync>;

/// Runtime options of a [`crate::Revisioner`]: compiled rules plus callbacks.
#[derive(Clone)]
pub struct RevisionOptions {
    pub hash_length: usize,
    pub prefix: String,
    pub global_exclude: RuleSet,
    pub rename_exclude: RuleSet,
    pub search_exclude: RuleSet,
    pub reference_update_exclude: RuleSet,
    pub manifest_file_name: String,
    pub version_file_name: String,
    pub pattern_cache_capacity: usize,
    pub transform_filename: Option<TransformFilename>,
    pub transform_path: Option<TransformPath>,
    pub binary_predicate: BinaryPredicate,
    pub annotator: Option<Annotator>,
    pub replacer: Option<Replacer>,
    pub reference_patterns: Option<ReferencePatterns>,
}

impl RevisionOptions {
    pub fn from_config(config: &RevisionConfig) -> crate::error::Result<Self> {
        Ok(Self {
            hash_length: config.hash_length,
            prefix: config.prefix.clone(),
            global_exclude: RuleSet::compile(&config.global_exclude)?,
            rename_exclude: RuleSet::compile(&config.rename_exclude)?,
            search_exclude: RuleSet::compile(&config.search_exclude)?,
            reference_update_exclude: RuleSet::compile(&config.reference_update_exclude)?,
            manifest_file_name: config.manifest_file_name.clone(),
            version_file_name: config.version_file_name.clone(),
            pattern_cache_capacity: config.pattern_cache_capacity,
            transform_filename: None,
            transform_path: None,
            binary_predicate: default_binary_predicate(),
            annotator: None,
            replacer: None,
            reference_patterns: None,
        })
    }

    pub fn with_transform_filename<F>(mut self, f: F) -> Self
    where
        F: Fn(&Asset, &str) -> String + Send + Sync + 'static,
    {
        self.transform_filename = Some(Arc::new(f));
        self
    }

    pub fn with_transform_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &str, &Asset, &Asset) -> String + Send + Sync + 'static,
    {
        self.transform_path = Some(Arc::new(f));
        self
    }

    pub fn with_binary_predicate<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8]) -> bool + Send + Sync + 'static,
    {
        self.binary_predicate = Arc::new(f);
        self
    }

    pub fn with_annotator<F>(mut self, f: F) -> Self
    where
        F: Fn(&[u8], &Asset) -> Vec<Fragment> + Send + Sync + 'static,
    {
        self.annotator = Some(Arc::new(f));
        self
    }

    pub fn with_replacer<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Fragment, &BoundaryPattern, &str, &Asset) + Send + Sync + 'static,
    {
        self.replacer = Some(Arc::new(f));
        self
    }

    /// Detect each spelling with the patterns `f` builds; group 1 of every
    /// pattern must capture the spelling (see [`BoundaryPattern::custom`]).
    pub fn with_reference_patterns<F>(mut self, f: F) -> Self
    where
        F: Fn(&Spelling) -> crate::error::Result<Vec<BoundaryPattern>> + Send + Sync + 'static,
    {
        self.reference_patterns = Some(Arc::new(f));
        self
    }

    /// Whether the asset may take part in references at all, as source or target.
    pub fn is_global(&self, asset: &Asset) -> bool {
        self.global_exclude.matches(&asset.rooted_path())
    }

    pub fn should_rename(&self, asset: &Asset) -> bool {
        let rooted = asset.rooted_path();
        !self.global_exclude.matches(&rooted) && !self.rename_exclude.matches(&rooted)
    }

    pub fn should_search(&self, asset: &Asset) -> bool {
        let rooted = asset.rooted_path();
        !self.global_exclude.matches(&rooted) && !self.search_exclude.matches(&rooted)
    }

    pub fn should_update_reference(&self, target: &Asset) -> bool {
        let rooted = target.rooted_path();
        !self.global_exclude.matches(&rooted) && !self.reference_update_exclude.matches(&rooted)
    }
}

impl Default for RevisionOptions {
    fn default() -> Self {
        Self::from_config(&RevisionConfig::default())
            .expect("built-in exclusion rules must compile")
    }
}

impl fmt::Debug for RevisionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevisionOptions")
            .field("hash_length", &self.hash_length)
            .field("prefix", &self.prefix)
            .field("global_exclude", &self.global_exclude)
            .field("rename_exclude", &self.rename_exclude)
            .field("search_exclude", &self.search_exclude)
            .field("reference_update_exclude", &self.reference_update_exclude)
            .field("manifest_file_name", &self.manifest_file_name)
            .field("version_file_name", &self.version_file_name)
            .field("transform_filename", &self.transform_filename.is_some())
            .field("transform_path", &self.transform_path.is_some())
            .field("annotator", &self.annotator.is_some())
            .field("replacer", &self.replacer.is_some())
            .field("reference_patterns", &self.reference_patterns.is_some())
            .finish()
    }
}
