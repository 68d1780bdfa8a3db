use std::time::Duration;

use srs_types::CommitId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("backend error: {0}")]
    Backend(#[from] srs_backend::BackendError),

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("commit {commit} has no signature")]
    MissingSignature { commit: CommitId },

    #[error("commit {commit} has an invalid signature: {reason}")]
    InvalidSignature { commit: CommitId, reason: String },

    #[error("no trusted key pinned for {url}")]
    UnpinnedTrust { url: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("trust anchor error: {0}")]
    TrustAnchor(String),

    #[error("invalid repository url: {0}")]
    InvalidUrl(#[from] srs_types::TypeError),

    #[error("repository {0} has no commits to establish trust over")]
    EmptyHistory(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] srs_store::StoreError),

    #[error("trust store error: {0}")]
    Trust(#[from] srs_trust::TrustError),
}

impl SyncError {
    /// Returns `true` for missing or invalid commit signatures.
    pub fn is_signature_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingSignature { .. } | Self::InvalidSignature { .. }
        )
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
