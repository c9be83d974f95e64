//! Error types for label normalization
//!
//! Canonicalization and rewriting are total over well-formed input, so the
//! only core error is a contract violation (`UnmappedLabel`). Everything
//! else comes from the collaborator layer: snapshot files, credential files,
//! and the tracker sink.

use thiserror::Error;

/// Label normalization error types
#[derive(Debug, Error)]
pub enum Error {
    /// A label on an issue has no entry in the canonicalization mapping.
    /// The mapping was built from an incomplete label population.
    #[error("Contract violation: label {label:?} is not in the canonicalization mapping")]
    UnmappedLabel { label: String },

    /// The sink was asked to update an issue it does not know about
    #[error("Issue not found: {0}")]
    IssueNotFound(String),

    /// Malformed or unusable credentials
    #[error("Credential error: {0}")]
    Credentials(String),

    /// Snapshot file could not be decoded or encoded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Underlying file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tracker rejected or failed an operation
    #[error("Tracker error: {0}")]
    Tracker(String),
}

/// Result type alias for label normalization operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_label_message_names_label() {
        let err = Error::UnmappedLabel {
            label: "Needs-Triage".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Contract violation"));
        assert!(msg.contains("\"Needs-Triage\""));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }
}
