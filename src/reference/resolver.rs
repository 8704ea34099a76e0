use std::ops::Range;
use std::sync::Arc;

use super::matcher::{absolute_spellings, relative_spellings};
use super::pattern::contains_literal;
use super::{BoundaryPattern, Reference, ReferenceMap, Spelling};
use crate::asset::{Asset, AssetId};
use crate::cache::PatternCache;
use crate::config::RevisionOptions;
use crate::error::Result;
use crate::pool::AssetPool;

/// Finds the references one asset's original contents make to the rest of the pool.
pub struct ReferenceResolver<'a> {
    options: &'a RevisionOptions,
    patterns: &'a PatternCache,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(options: &'a RevisionOptions, patterns: &'a PatternCache) -> Self {
        Self { options, patterns }
    }

    /// Whether `context`'s own contents are scanned at all.
    pub fn is_searchable(&self, context: &Asset) -> bool {
        !context.is_binary() && self.options.should_search(context)
    }

    /// Build the reference map of `context`.
    ///
    /// Every relative spelling of every candidate is tried before any absolute
    /// one, so relative resolutions win when two candidates share a spelling.
    pub fn resolve(&self, pool: &AssetPool, context: AssetId) -> Result<ReferenceMap> {
        let mut map = ReferenceMap::default();
        let ctx = pool.get(context);
        if !self.is_searchable(ctx) {
            return Ok(map);
        }

        let candidates: Vec<AssetId> = pool
            .ids()
            .filter(|&id| !self.options.is_global(pool.get(id)))
            .collect();

        // Texts that spell the context itself; never a reference to anything else.
        let mut reserved: Vec<String> = Vec::new();

        let groups: [fn(&Asset, &Asset) -> Vec<Spelling>; 2] = [relative_spellings, absolute_spellings];
        for spell in groups {
            for &candidate in &candidates {
                let target = pool.get(candidate);
                for spelling in spell(target, ctx) {
                    if reserved.contains(&spelling.text)
                        || !contains_literal(ctx.original_contents(), &spelling.text)
                    {
                        continue;
                    }

                    for pattern in self.patterns_for(&spelling)? {
                        if !pattern.is_match(ctx.original_contents()) {
                            continue;
                        }

                        if candidate == context {
                            if map.get(&spelling.text).is_none() {
                                reserved.push(spelling.text.clone());
                            }
                            break;
                        }

                        match map.get_mut(&spelling.text) {
                            None => {
                                log::debug!(
                                    "Found reference to {} ({}) in {}",
                                    target.relative_path(),
                                    spelling.text,
                                    ctx.relative_path()
                                );
                                map.insert(Reference {
                                    target: candidate,
                                    spelling: spelling.clone(),
                                    patterns: vec![pattern],
                                });
                            }
                            Some(existing) if existing.target == candidate => {
                                if !existing.patterns.iter().any(|p| p.as_str() == pattern.as_str()) {
                                    existing.patterns.push(pattern);
                                }
                            }
                            Some(existing) => {
                                log::warn!(
                                    "Ambiguous reference '{}' in {}: resolves to both {} and {}, keeping {}",
                                    spelling.text,
                                    ctx.relative_path(),
                                    pool.get(existing.target).relative_path(),
                                    target.relative_path(),
                                    pool.get(existing.target).relative_path()
                                );
                                break;
                            }
                        }
                    }
                }
            }
        }

        drop_shadowed(&mut map, ctx);
        Ok(map)
    }

    /// Patterns that detect `spelling`: the caller's builder when configured,
    /// otherwise the cached built-in boundary pattern.
    fn patterns_for(&self, spelling: &Spelling) -> Result<Vec<Arc<BoundaryPattern>>> {
        match &self.options.reference_patterns {
            Some(build) => Ok(build(spelling)?.into_iter().map(Arc::new).collect()),
            None => Ok(vec![self.patterns.get_or_compile(&spelling.text, spelling.boundary())?]),
        }
    }
}

/// Drop references whose every occurrence lies inside a longer occurrence of
/// another reference (`space.ttf` within `font1 space.ttf`).
fn drop_shadowed(map: &mut ReferenceMap, context: &Asset) {
    let contents = context.original_contents();
    let spans: Vec<Vec<Range<usize>>> = map
        .iter()
        .map(|r| r.patterns.iter().flat_map(|p| p.find_spans(contents)).collect())
        .collect();

    let inside_longer = |i: usize, span: &Range<usize>| {
        spans.iter().enumerate().any(|(j, other)| {
            j != i
                && other
                    .iter()
                    .any(|o| o.start <= span.start && span.end <= o.end && o.len() > span.len())
        })
    };
    let shadowed: Vec<String> = map
        .iter()
        .enumerate()
        .filter(|(i, _)| !spans[*i].is_empty() && spans[*i].iter().all(|s| inside_longer(*i, s)))
        .map(|(_, r)| r.spelling.text.clone())
        .collect();

    for text in &shadowed {
        log::debug!(
            "Dropping '{}' in {}: only found inside longer references",
            text,
            context.relative_path()
        );
    }
    if !shadowed.is_empty() {
        map.retain(|r| !shadowed.contains(&r.spelling.text));
    }
}
