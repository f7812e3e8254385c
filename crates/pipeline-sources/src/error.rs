//! Error types for aggregate sources.

use std::path::PathBuf;

/// Errors that can occur while producing raw aggregates.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The source is not reachable or not ready.
    #[error("source unavailable: {reason}")]
    Unavailable { reason: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a record file.
    #[error("parse error in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// The record file format is not supported.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A timeout occurred while waiting for the source.
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The records are well-formed but violate a data rule.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl SourceError {
    /// Creates a new parse error.
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new source unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::unavailable("database offline");
        assert_eq!(err.to_string(), "source unavailable: database offline");

        let err = SourceError::parse("/data/bids.yaml", "invalid YAML");
        assert_eq!(err.to_string(), "parse error in /data/bids.yaml: invalid YAML");

        let err = SourceError::InvalidData("negative value".into());
        assert_eq!(err.to_string(), "invalid data: negative value");
    }

    #[test]
    fn test_is_transient() {
        assert!(SourceError::unavailable("network error").is_transient());
        assert!(SourceError::Timeout { seconds: 30 }.is_transient());
        assert!(!SourceError::UnsupportedFormat("csv".into()).is_transient());
        assert!(!SourceError::parse("x", "y").is_transient());
    }
}
