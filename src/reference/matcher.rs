//! Enumerate the spellings a context asset could use for a candidate asset.

use super::Spelling;
use crate::asset::Asset;
use crate::path;

/// Extensions whose files take part in extension-less module includes.
const SCRIPT_MODULE_EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs"];

pub fn is_script_module(extension: &str) -> bool {
    let ext = extension.to_ascii_lowercase();
    SCRIPT_MODULE_EXTENSIONS.contains(&ext.as_str())
}

/// Spellings relative to the directory of `context`.
///
/// A candidate in the same directory or below it gets `sub/name.ext` and
/// `./sub/name.ext`; anything else gets a single `../` traversal.
pub fn relative_spellings(candidate: &Asset, context: &Asset) -> Vec<Spelling> {
    let candidate_dir = path::dir_with_sep(candidate.original_path());
    let context_dir = path::dir_with_sep(context.original_path());

    let mut out = Vec::new();
    if candidate_dir.starts_with(context_dir) {
        let below = &candidate.original_path()[context_dir.len()..];
        out.push(Spelling::relative(below));
        out.push(Spelling::relative(format!("./{}", below)));
    } else {
        let traversal = path::relative_dir(
            path::dir_with_sep(context.relative_path()),
            path::dir_with_sep(candidate.relative_path()),
        );
        out.push(Spelling::relative(path::join_path(
            &traversal,
            &candidate.original_filename(),
        )));
    }

    with_short_forms(out, candidate, context)
}

/// Spellings anchored at the pool root, with and without the leading slash.
pub fn absolute_spellings(candidate: &Asset, context: &Asset) -> Vec<Spelling> {
    let rel = candidate.relative_path();
    let out = vec![
        Spelling::absolute(format!("/{}", rel)),
        Spelling::absolute(rel),
    ];
    with_short_forms(out, candidate, context)
}

fn with_short_forms(mut spellings: Vec<Spelling>, candidate: &Asset, context: &Asset) -> Vec<Spelling> {
    if !is_script_module(candidate.original_extension())
        || !is_script_module(context.original_extension())
    {
        return spellings;
    }

    let ext_len = candidate.original_extension().len();
    let short: Vec<Spelling> = spellings
        .iter()
        .filter(|s| s.text.len() > ext_len)
        .map(|s| s.short_form(&s.text[..s.text.len() - ext_len]))
        .collect();
    spellings.extend(short);
    spellings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::AssetPool;
    use crate::reference::SpellingKind;

    const BASE: &str = "/first/second";

    /// Freeze a two-asset pool so relative paths are populated.
    fn pair(context: &str, candidate: &str) -> (Asset, Asset) {
        let mut pool = AssetPool::new();
        pool.add(Asset::new(context, BASE, Vec::new(), false)).unwrap();
        pool.add(Asset::new(candidate, BASE, Vec::new(), false)).unwrap();
        pool.freeze();
        let ctx = pool.find(&crate::path::relative_path(BASE, context, Some(false))).unwrap();
        let cand = pool.find(&crate::path::relative_path(BASE, candidate, Some(false))).unwrap();
        (pool.get(ctx).clone(), pool.get(cand).clone())
    }

    fn texts(spellings: &[Spelling]) -> Vec<&str> {
        spellings.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_relative_zero_traversals() {
        let (ctx, cand) = pair("/first/second/third/index.html", "/first/second/third/other.html");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["other.html", "./other.html"]);

        let (ctx, cand) = pair("/first/second/third/index.html", "/first/second/third/fourth/other.html");
        assert_eq!(
            texts(&relative_spellings(&cand, &ctx)),
            vec!["fourth/other.html", "./fourth/other.html"]
        );
    }

    #[test]
    fn test_relative_one_traversal() {
        let (ctx, cand) = pair("/first/second/third/index.html", "/first/second/index.html");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["../index.html"]);

        let (ctx, cand) = pair("/first/second/third/index.html", "/first/second/other/index.html");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["../other/index.html"]);

        let (ctx, cand) = pair("/first/second/third/index.html", "/first/second/thirder/index.html");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["../thirder/index.html"]);

        let (ctx, cand) = pair("/first/second/third/index.html", "/first/second/other/advanced/index.html");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["../other/advanced/index.html"]);
    }

    #[test]
    fn test_relative_two_traversals() {
        let (ctx, cand) = pair("/first/second/third/fourth/index.html", "/first/second/index.html");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["../../index.html"]);

        let (ctx, cand) = pair("/first/second/third/fourth/fifth/index.html", "/first/second/other/index.html");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["../../../other/index.html"]);
    }

    #[test]
    fn test_absolute_spellings() {
        let (ctx, cand) = pair("/first/second/third/fourth/index.html", "/first/second/other/index.html");
        assert_eq!(
            texts(&absolute_spellings(&cand, &ctx)),
            vec!["/other/index.html", "other/index.html"]
        );
        assert!(absolute_spellings(&cand, &ctx).iter().all(|s| !s.relative));
    }

    #[test]
    fn test_no_short_form_from_markup() {
        let (ctx, cand) = pair("/first/second/third/index.html", "/first/second/third/script.js");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["script.js", "./script.js"]);
        assert_eq!(texts(&absolute_spellings(&cand, &ctx)), vec!["/third/script.js", "third/script.js"]);
    }

    #[test]
    fn test_short_form_between_scripts() {
        let (ctx, cand) = pair("/first/second/third/other.js", "/first/second/third/script.js");
        let rel = relative_spellings(&cand, &ctx);
        assert_eq!(texts(&rel), vec!["script.js", "./script.js", "script", "./script"]);
        assert_eq!(rel[2].kind, SpellingKind::ModuleShortForm);
        assert!(rel[2].relative);

        let abs = absolute_spellings(&cand, &ctx);
        assert_eq!(
            texts(&abs),
            vec!["/third/script.js", "third/script.js", "/third/script", "third/script"]
        );
        assert!(!abs[3].relative);
    }

    #[test]
    fn test_spelling_with_space() {
        let (ctx, cand) = pair("/first/second/css/style.css", "/first/second/font/font1 space.ttf");
        assert_eq!(texts(&relative_spellings(&cand, &ctx)), vec!["../font/font1 space.ttf"]);
    }
}
