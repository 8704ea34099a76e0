use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Number of leading bytes inspected by [`looks_binary`].
pub const BINARY_SNIFF_LEN: usize = 50;

/// Predicate deciding whether a buffer holds binary content.
pub type BinaryPredicate = Arc<dyn Fn(&[u8]) -> bool + Send + Sync>;

/// Default binary heuristic: a NUL byte within the first 50 bytes.
pub fn looks_binary(contents: &[u8]) -> bool {
    let sniff = &contents[..contents.len().min(BINARY_SNIFF_LEN)];
    sniff.contains(&0)
}

/// The default predicate wrapped for [`crate::config::RevisionOptions`].
pub fn default_binary_predicate() -> BinaryPredicate {
    Arc::new(looks_binary)
}

/// Compute SHA256 hash of a byte buffer as lowercase hex
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash() {
        let hash = content_hash(b"test content");
        assert_eq!(hash.len(), 64); // SHA256 produces 64 hex chars
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(hash, content_hash(b"test content"));
        assert_ne!(hash, content_hash(b"test content!"));
    }

    #[test]
    fn test_looks_binary_jpeg_header() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert!(looks_binary(&jpeg));
    }

    #[test]
    fn test_looks_binary_text() {
        assert!(!looks_binary(b"body { background: url(img/a.png); }"));
        assert!(!looks_binary(b""));
        assert!(!looks_binary("unicode über text".as_bytes()));
    }

    #[test]
    fn test_looks_binary_only_sniffs_prefix() {
        let mut late_nul = vec![b'a'; BINARY_SNIFF_LEN];
        late_nul.push(0);
        assert!(!looks_binary(&late_nul));

        let mut early_nul = vec![b'a'; BINARY_SNIFF_LEN - 1];
        early_nul.push(0);
        assert!(looks_binary(&early_nul));
    }
}
