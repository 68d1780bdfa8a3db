use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid commit id {value:?}: {reason}")]
    InvalidCommitId { value: String, reason: String },

    #[error("invalid repository url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
