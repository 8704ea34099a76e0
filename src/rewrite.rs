use std::cmp::Reverse;
use std::ops::Range;

use crate::asset::{Asset, AssetId};
use crate::config::RevisionOptions;
use crate::path;
use crate::pool::AssetPool;
use crate::reference::{Reference, SpellingKind};

/// Rewrites the references inside each asset to the revisioned names of their targets.
pub struct ReferenceRewriter<'a> {
    options: &'a RevisionOptions,
}

impl<'a> ReferenceRewriter<'a> {
    pub fn new(options: &'a RevisionOptions) -> Self {
        Self { options }
    }

    /// Text that replaces `reference` inside `context`, or `None` to leave it alone.
    pub fn replacement(&self, pool: &AssetPool, context: &Asset, reference: &Reference) -> Option<String> {
        let target = pool.get(reference.target);
        if !self.options.should_update_reference(target) {
            return None;
        }
        let final_filename = target.final_filename()?;

        let spelling = &reference.spelling;
        let (spelled_name, new_name) = match spelling.kind {
            SpellingKind::ModuleShortForm => {
                (target.original_basename().to_string(), path::without_ext(final_filename))
            }
            SpellingKind::Relative | SpellingKind::Absolute => (target.original_filename(), final_filename),
        };
        let dir = spelling
            .text
            .strip_suffix(spelled_name.as_str())
            .unwrap_or_else(|| path::dir_with_sep(&spelling.text));
        let new_path = format!("{}{}", dir, new_name);

        if let Some(transform) = &self.options.transform_path {
            return Some(transform(&new_path, &spelling.text, target, context));
        }
        if !spelling.relative && !self.options.prefix.is_empty() {
            return Some(path::join_url(&self.options.prefix, &new_path));
        }
        Some(new_path)
    }

    /// New contents of `context` with every resolved reference replaced.
    ///
    /// Contents are split into fragments by the configured annotator (one
    /// fragment by default). Without a custom replacer, positions come from each
    /// fragment's original bytes and all replacements are spliced in one pass, so
    /// replaced text is never matched again. Returns `None` when the asset is not
    /// rewritten at all.
    pub fn rewrite(&self, pool: &AssetPool, context: AssetId) -> Option<Vec<u8>> {
        let ctx = pool.get(context);
        if ctx.is_binary() || !self.options.should_search(ctx) || ctx.references().is_empty() {
            return None;
        }

        let mut updates: Vec<(&Reference, String)> = Vec::new();
        for reference in ctx.references().iter() {
            match self.replacement(pool, ctx, reference) {
                Some(replacement) => updates.push((reference, replacement)),
                None => log::debug!(
                    "Reference '{}' in {} left as is",
                    reference.spelling.text,
                    ctx.relative_path()
                ),
            }
        }
        if updates.is_empty() {
            return None;
        }

        let original = ctx.original_contents();
        let fragments = match &self.options.annotator {
            Some(annotate) => annotate(original, ctx),
            None => vec![Fragment::new(original.to_vec())],
        };

        let mut out = Vec::with_capacity(original.len());
        for mut fragment in fragments {
            if !fragment.skip {
                match &self.options.replacer {
                    Some(replace) => {
                        for (reference, replacement) in &updates {
                            let target = pool.get(reference.target);
                            for pattern in &reference.patterns {
                                replace(&mut fragment, &**pattern, replacement.as_str(), target);
                            }
                        }
                    }
                    None => fragment.contents = splice(&fragment.contents, &updates),
                }
            }
            out.extend_from_slice(&fragment.contents);
        }

        if out.as_slice() == original {
            None
        } else {
            Some(out)
        }
    }
}

/// A piece of an asset's contents as produced by an annotator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub contents: Vec<u8>,
    /// Left exactly as is by the rewriter
    pub skip: bool,
}

impl Fragment {
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self { contents: contents.into(), skip: false }
    }

    pub fn skipped(contents: impl Into<Vec<u8>>) -> Self {
        Self { contents: contents.into(), skip: true }
    }
}

fn splice(contents: &[u8], updates: &[(&Reference, String)]) -> Vec<u8> {
    let mut edits: Vec<(Range<usize>, &str)> = Vec::new();
    for (reference, replacement) in updates {
        for pattern in &reference.patterns {
            for span in pattern.find_spans(contents) {
                edits.push((span, replacement.as_str()));
            }
        }
    }
    edits.sort_by_key(|(span, _)| (span.start, Reverse(span.end)));

    let mut out = Vec::with_capacity(contents.len());
    let mut cursor = 0;
    for (span, replacement) in edits {
        if span.start < cursor {
            continue;
        }
        out.extend_from_slice(&contents[cursor..span.start]);
        out.extend_from_slice(replacement.as_bytes());
        cursor = span.end;
    }
    out.extend_from_slice(&contents[cursor..]);
    out
}
