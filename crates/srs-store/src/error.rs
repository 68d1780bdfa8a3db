/// Errors from file store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No entry exists at the path.
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// An entry already exists at the path.
    #[error("entry already exists: {0}")]
    AlreadyExists(String),

    /// A path component that must be a directory is a file.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// A file operation was attempted on a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// `rmdir` on a directory that still has entries.
    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// The path is malformed or not permitted for this operation.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// File contents were expected to be UTF-8.
    #[error("file is not valid UTF-8: {0}")]
    Encoding(String),

    /// Internal lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// I/O error from the underlying storage backend.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Returns `true` for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
