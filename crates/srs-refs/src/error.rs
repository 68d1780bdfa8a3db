//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference was not found.
    #[error("ref not found: {name}")]
    NotFound { name: String },

    /// A reference with this name already exists and `force` was not set.
    #[error("ref already exists: {name}")]
    AlreadyExists { name: String },

    /// The branch or remote name is invalid.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// The full ref name is invalid.
    #[error("invalid ref name: {name}: {reason}")]
    InvalidRefName { name: String, reason: String },

    /// The stored ref contents could not be parsed.
    #[error("malformed ref {name}: {content:?}")]
    Malformed { name: String, content: String },

    /// Symbolic refs point at each other too deeply to resolve.
    #[error("symbolic ref chain too deep at {name}")]
    SymbolicLoop { name: String },

    /// Underlying file store failure.
    #[error("store error: {0}")]
    Store(#[from] srs_store::StoreError),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
