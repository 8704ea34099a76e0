use thiserror::Error;

/// Main error type for revall
#[derive(Error, Debug)]
pub enum RevallError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A result accessor was used before a successful run
    #[error("revision() must be called first!")]
    NotRevisioned,

    /// Asset contents delivered in a shape the engine cannot buffer
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Ingestion attempted after the pool has been frozen by a run
    #[error("Asset pool is frozen, no files can be added after run()")]
    PoolFrozen,

    /// Exclusion rule or reference pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Descriptor serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File watcher setup or event loop failures
    #[error("Watch error: {0}")]
    Watch(String),
}

/// Convenient Result type using RevallError
pub type Result<T> = std::result::Result<T, RevallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RevallError::InvalidInput("Test error".to_string());
        assert!(err.to_string().contains("Invalid input"));
        assert!(err.to_string().contains("Test error"));
    }

    #[test]
    fn test_watch_error_display() {
        let err = RevallError::Watch("inotify limit reached".to_string());
        assert_eq!(err.to_string(), "Watch error: inotify limit reached");
    }

    #[test]
    fn test_not_revisioned_message() {
        let err = RevallError::NotRevisioned;
        assert_eq!(err.to_string(), "revision() must be called first!");
    }

    #[test]
    fn test_error_from_regex() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: RevallError = regex_err.into();
        assert!(matches!(err, RevallError::InvalidPattern(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RevallError = io_err.into();
        assert!(matches!(err, RevallError::Io(_)));
    }
}
