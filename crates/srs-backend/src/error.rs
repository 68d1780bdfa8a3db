use thiserror::Error;

/// Errors raised by repository backends.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No repository is hosted at the URL.
    #[error("could not resolve remote repository {url}")]
    UnknownRemote { url: String },

    /// The remote could not be reached.
    #[error("network error talking to {url}: {reason}")]
    Network { url: String, reason: String },

    /// The local path holds no repository metadata.
    #[error("not a repository: {0}")]
    NotARepository(String),

    /// Clone target already has contents.
    #[error("destination {0} already exists and is not empty")]
    DestinationExists(String),

    /// A branch, ref or commit id did not resolve.
    #[error("unknown revision {rev} in {path}")]
    UnknownRevision { path: String, rev: String },

    /// A commit object is absent from the local object directory.
    #[error("missing object {oid}")]
    MissingObject { oid: String },

    /// Stored metadata or objects could not be decoded.
    #[error("corrupt repository data at {path}: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("backend lock poisoned")]
    LockPoisoned,

    #[error("store error: {0}")]
    Store(#[from] srs_store::StoreError),

    #[error("ref error: {0}")]
    Refs(#[from] srs_refs::RefError),
}

pub type BackendResult<T> = Result<T, BackendError>;
