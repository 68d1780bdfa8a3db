use std::path::PathBuf;

/// Errors from trust store operations.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    /// A stored digest key is not 64 hex characters.
    #[error("invalid trust digest: {0}")]
    InvalidDigest(String),

    /// The on-disk trust document could not be parsed or produced.
    #[error("trust document error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The trust document has a version this build does not understand.
    #[error("unsupported trust document version {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trust store lock poisoned")]
    LockPoisoned,
}

pub type TrustResult<T> = Result<T, TrustError>;
