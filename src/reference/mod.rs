//! Reference discovery: which assets mention which other assets, and how.
//!
//! The matcher enumerates every spelling one asset could use for another,
//! the patterns module turns a spelling into a boundary-anchored regex, and the
//! resolver scans an asset's original contents for them.

mod matcher;
mod pattern;
mod resolver;

pub use matcher::{absolute_spellings, is_script_module, relative_spellings};
pub use pattern::{Boundary, BoundaryPattern};
pub use resolver::ReferenceResolver;

use std::collections::HashMap;
use std::sync::Arc;

use crate::asset::AssetId;

/// How a spelling addresses its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpellingKind {
    /// Relative to the referencing file's directory (`img/a.png`, `../a.png`)
    Relative,
    /// Relative to the pool root (`/img/a.png`, `img/a.png`)
    Absolute,
    /// Script module include with the extension dropped (`./short`)
    ModuleShortForm,
}

/// One textual way of writing a path to an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spelling {
    pub text: String,
    pub kind: SpellingKind,
    /// False when the spelling is anchored at the pool root.
    pub relative: bool,
}

impl Spelling {
    pub fn relative(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SpellingKind::Relative, relative: true }
    }

    pub fn absolute(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SpellingKind::Absolute, relative: false }
    }

    /// Extension-less variant keeping the anchoring of `self`.
    pub fn short_form(&self, text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: SpellingKind::ModuleShortForm, relative: self.relative }
    }

    pub fn boundary(&self) -> Boundary {
        match self.kind {
            SpellingKind::ModuleShortForm => Boundary::Quoted,
            SpellingKind::Relative | SpellingKind::Absolute => Boundary::Delimited,
        }
    }
}

/// A resolved reference found in an asset's contents.
#[derive(Debug, Clone)]
pub struct Reference {
    pub target: AssetId,
    pub spelling: Spelling,
    pub patterns: Vec<Arc<BoundaryPattern>>,
}

impl Reference {
    pub fn is_relative(&self) -> bool {
        self.spelling.relative
    }
}

/// Spelling text -> reference, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    entries: Vec<Reference>,
    by_text: HashMap<String, usize>,
}

impl ReferenceMap {
    pub fn get(&self, text: &str) -> Option<&Reference> {
        self.by_text.get(text).map(|&i| &self.entries[i])
    }

    pub(crate) fn get_mut(&mut self, text: &str) -> Option<&mut Reference> {
        match self.by_text.get(text) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    pub(crate) fn insert(&mut self, reference: Reference) {
        let text = reference.spelling.text.clone();
        if self.by_text.contains_key(&text) {
            return;
        }
        self.by_text.insert(text, self.entries.len());
        self.entries.push(reference);
    }

    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&Reference) -> bool) {
        self.entries.retain(|r| keep(r));
        self.by_text = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, r)| (r.spelling.text.clone(), i))
            .collect();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct referenced assets in the order they were first discovered.
    pub fn targets(&self) -> Vec<AssetId> {
        let mut seen = Vec::new();
        for reference in &self.entries {
            if !seen.contains(&reference.target) {
                seen.push(reference.target);
            }
        }
        seen
    }

    /// Whether any reference is anchored at the pool root.
    pub fn has_absolute(&self) -> bool {
        self.entries.iter().any(|r| !r.is_relative())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(text: &str, target: usize) -> Reference {
        let spelling = Spelling::relative(text);
        let pattern = BoundaryPattern::compile(text, spelling.boundary()).unwrap();
        Reference { target: AssetId(target), spelling, patterns: vec![Arc::new(pattern)] }
    }

    #[test]
    fn test_map_keeps_first_insert() {
        let mut map = ReferenceMap::default();
        map.insert(reference("a.js", 1));
        map.insert(reference("a.js", 2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a.js").unwrap().target, AssetId(1));
    }

    #[test]
    fn test_targets_distinct_in_discovery_order() {
        let mut map = ReferenceMap::default();
        map.insert(reference("b.js", 2));
        map.insert(reference("./b.js", 2));
        map.insert(reference("a.js", 1));
        assert_eq!(map.targets(), vec![AssetId(2), AssetId(1)]);
    }

    #[test]
    fn test_retain_reindexes() {
        let mut map = ReferenceMap::default();
        map.insert(reference("a.js", 1));
        map.insert(reference("b.js", 2));
        map.retain(|r| r.spelling.text != "a.js");
        assert!(map.get("a.js").is_none());
        assert_eq!(map.get("b.js").unwrap().target, AssetId(2));
        assert_eq!(map.targets(), vec![AssetId(2)]);
    }

    #[test]
    fn test_short_form_keeps_anchoring() {
        let abs = Spelling::absolute("/js/short.js");
        let short = abs.short_form("/js/short");
        assert_eq!(short.kind, SpellingKind::ModuleShortForm);
        assert!(!short.relative);
        assert_eq!(short.boundary(), Boundary::Quoted);
        assert_eq!(abs.boundary(), Boundary::Delimited);
    }
}
