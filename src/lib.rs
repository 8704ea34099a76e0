pub mod asset;
pub mod cache;
pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod hash;
pub mod ingest;
pub mod naming;
pub mod path;
pub mod pool;
pub mod reference;
pub mod revisioner;
pub mod rewrite;
pub mod rules;
pub mod watch;

pub use asset::{Asset, AssetContents, AssetId};
pub use config::{Config, RevisionOptions};
pub use error::{Result, RevallError};
pub use revisioner::{DescriptorFile, Revisioner, RunState};
pub use rewrite::Fragment;
pub use rules::{Rule, RuleSet, RuleSpec};
