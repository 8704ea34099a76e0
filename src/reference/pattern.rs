//! Boundary-anchored byte patterns for reference spellings.

use std::ops::Range;

use memchr::memmem;
use regex::bytes::Regex;

use crate::error::{Result, RevallError};

/// Characters that may appear inside a path; anything else ends one.
const PATH_CHAR_CLASS: &str = r"A-Za-z0-9._/\-";

/// What must surround a spelling for it to count as a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// Any non-path character (quote, space, paren, `?`, `#`...) or text edge
    Delimited,
    /// A quote character on the left, a quote or text end on the right
    Quoted,
    /// Caller-supplied regex whose first group captures the spelling
    Custom,
}

/// A compiled matcher for one literal spelling.
#[derive(Debug, Clone)]
pub struct BoundaryPattern {
    literal: String,
    boundary: Boundary,
    regex: Regex,
}

impl BoundaryPattern {
    pub fn compile(literal: &str, boundary: Boundary) -> Result<Self> {
        let escaped = regex::escape(literal);
        let source = match boundary {
            Boundary::Delimited => format!(
                r"(?:^|(?-u:[^{cls}]))({lit})(?:(?-u:[^{cls}])|$)",
                cls = PATH_CHAR_CLASS,
                lit = escaped
            ),
            Boundary::Quoted => format!(r#"['"]({})(?:['"]|$)"#, escaped),
            Boundary::Custom => {
                return Err(RevallError::InvalidInput(format!(
                    "no built-in boundary for custom pattern of '{}'",
                    literal
                )))
            }
        };
        Ok(Self {
            literal: literal.to_string(),
            boundary,
            regex: Regex::new(&source)?,
        })
    }

    /// Wrap a caller-written regex for `literal`. Group 1 must capture the
    /// spelling itself; everything around it is context left untouched.
    pub fn custom(literal: &str, source: &str) -> Result<Self> {
        let regex = Regex::new(source)?;
        if regex.captures_len() < 2 {
            return Err(RevallError::InvalidInput(format!(
                "pattern for '{}' has no capture group: {}",
                literal, source
            )));
        }
        Ok(Self {
            literal: literal.to_string(),
            boundary: Boundary::Custom,
            regex,
        })
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        contains_literal(haystack, &self.literal) && self.regex.is_match(haystack)
    }

    /// Byte ranges of every occurrence of the spelling itself.
    ///
    /// The search resumes right after each spelling rather than after the
    /// trailing boundary, so a delimiter shared by two adjacent occurrences
    /// (`a.js a.js`) serves both.
    pub fn find_spans(&self, haystack: &[u8]) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        if !contains_literal(haystack, &self.literal) {
            return spans;
        }

        let mut at = 0;
        while at <= haystack.len() {
            let Some(caps) = self.regex.captures_at(haystack, at) else {
                break;
            };
            let Some(m) = caps.get(1) else {
                break;
            };
            if !m.is_empty() {
                spans.push(m.range());
            }
            at = m.end().max(at + 1);
        }
        spans
    }

    /// `haystack` with every occurrence of the spelling replaced by `replacement`.
    pub fn replace_all(&self, haystack: &[u8], replacement: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(haystack.len());
        let mut cursor = 0;
        for span in self.find_spans(haystack) {
            out.extend_from_slice(&haystack[cursor..span.start]);
            out.extend_from_slice(replacement.as_bytes());
            cursor = span.end;
        }
        out.extend_from_slice(&haystack[cursor..]);
        out
    }
}

/// Cheap literal prefilter ahead of the regex.
pub fn contains_literal(haystack: &[u8], literal: &str) -> bool {
    !literal.is_empty() && memmem::find(haystack, literal.as_bytes()).is_some()
}
