//! Exclusion rules matched against an asset's root-relative path.
//!
//! Rules see the path with a leading slash (`/css/style.css`), so an anchored
//! pattern like `^/favicon\.ico$` only matches the file at the pool root.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Rule as written in the configuration file.
///
/// A bare string is a suffix rule, a table with a `pattern` key is a regular
/// expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Suffix(String),
    Pattern { pattern: String },
}

impl RuleSpec {
    pub fn suffix(s: impl Into<String>) -> Self {
        RuleSpec::Suffix(s.into())
    }

    pub fn pattern(p: impl Into<String>) -> Self {
        RuleSpec::Pattern { pattern: p.into() }
    }
}

/// Compiled exclusion rule
#[derive(Debug, Clone)]
pub enum Rule {
    /// Case-insensitive "path ends with"
    Suffix(String),
    /// Regular expression searched anywhere in the path
    Pattern(Regex),
}

impl Rule {
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        Ok(match spec {
            RuleSpec::Suffix(s) => Rule::Suffix(s.to_lowercase()),
            RuleSpec::Pattern { pattern } => Rule::Pattern(Regex::new(pattern)?),
        })
    }

    pub fn matches(&self, rooted_path: &str) -> bool {
        match self {
            Rule::Suffix(suffix) => rooted_path.to_lowercase().ends_with(suffix.as_str()),
            Rule::Pattern(re) => re.is_match(rooted_path),
        }
    }
}

/// An ordered collection of rules; matches when any rule does.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn compile(specs: &[RuleSpec]) -> Result<Self> {
        let rules = specs.iter().map(Rule::compile).collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn matches(&self, rooted_path: &str) -> bool {
        self.rules.iter().any(|r| r.matches(rooted_path))
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Site icon kept at its conventional name by default.
pub fn default_global_exclude() -> Vec<RuleSpec> {
    vec![RuleSpec::pattern(r"^/favicon\.ico$")]
}
