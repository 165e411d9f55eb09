use std::path::PathBuf;

use thiserror::Error;

use crate::vocab::TokenId;

/// Errors that can occur while preparing cloze QA batches.
#[derive(Debug, Error)]
pub enum PrepError {
    /// A file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An example file has fewer lines than the fixed layout requires.
    #[error("example {path} is truncated: expected at least {expected} lines, found {found}")]
    TruncatedExample {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// An `@entity` token appeared outside the example's candidate list.
    #[error("unmapped entity token {token:?} in {path}")]
    UnmappedEntity { token: String, path: PathBuf },

    /// The answer resolved to an id outside the entity range.
    #[error("answer id {id} out of range in {path} (n_entities = {n_entities})")]
    AnswerOutOfRange {
        id: TokenId,
        n_entities: usize,
        path: PathBuf,
    },

    /// A candidate resolved to an id outside the entity range.
    #[error("candidate id {id} out of range in {path} (n_entities = {n_entities})")]
    CandidateOutOfRange {
        id: TokenId,
        n_entities: usize,
        path: PathBuf,
    },

    /// A context or question word id exceeded the vocabulary size.
    #[error("{field} word id {id} out of bounds in {path} (vocab size = {vocab_size})")]
    WordIdOutOfBounds {
        /// Which field held the offending id (`"context"` or `"question"`).
        field: &'static str,
        id: TokenId,
        vocab_size: usize,
        path: PathBuf,
    },

    /// The stream configuration is inconsistent or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for batch preparation operations.
pub type Result<T> = std::result::Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = PrepError::UnmappedEntity {
            token: "@entity7".into(),
            path: PathBuf::from("q/001.question"),
        };
        assert!(err.to_string().contains("@entity7"));
        assert!(err.to_string().contains("001.question"));

        let err = PrepError::AnswerOutOfRange {
            id: 9,
            n_entities: 5,
            path: PathBuf::from("q/002.question"),
        };
        assert!(err.to_string().contains("9"));
        assert!(err.to_string().contains("n_entities = 5"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PrepError>();
    }
}
