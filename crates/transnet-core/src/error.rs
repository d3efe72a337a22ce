//! Unified error types for the transnet crates
//!
//! [`TransnetError`] covers the faults that can occur around the inference core: reading
//! datasets, parsing configuration, and lookups against a [`crate::TopologyStore`].
//! Expected traversal outcomes (loops, dead ends, duplicates) are *not* errors; they are
//! reported through the trace outcome returned by the engine.
//!
//! # Example
//!
//! ```ignore
//! use transnet_core::{TransnetError, TransnetResult};
//!
//! fn load(path: &str) -> TransnetResult<Topology> {
//!     let store = open_store(path)?;
//!     Topology::load(&store, &classes)
//! }
//! ```

use thiserror::Error;

/// Unified error type for all transnet operations.
#[derive(Error, Debug)]
pub enum TransnetError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Store lookups that failed outright (as opposed to finding nothing)
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using TransnetError.
pub type TransnetResult<T> = Result<T, TransnetError>;

impl From<anyhow::Error> for TransnetError {
    fn from(err: anyhow::Error) -> Self {
        TransnetError::Other(err.to_string())
    }
}

impl From<String> for TransnetError {
    fn from(s: String) -> Self {
        TransnetError::Other(s)
    }
}

impl From<&str> for TransnetError {
    fn from(s: &str) -> Self {
        TransnetError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for TransnetError {
    fn from(err: serde_json::Error) -> Self {
        TransnetError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransnetError::Lookup("node 17 has no coordinates".into());
        assert!(err.to_string().contains("Lookup error"));
        assert!(err.to_string().contains("node 17"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TransnetError = io_err.into();
        assert!(matches!(err, TransnetError::Io(_)));
    }

    #[test]
    fn test_json_error_becomes_parse_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TransnetError = json_err.into();
        assert!(matches!(err, TransnetError::Parse(_)));
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> TransnetResult<()> {
            Err(TransnetError::Lookup("unknown station".into()))
        }

        fn outer() -> TransnetResult<()> {
            inner()?;
            Ok(())
        }

        assert!(outer().is_err());
    }
}
