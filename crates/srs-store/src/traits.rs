use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::path;

/// What kind of entry lives at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Metadata for a single entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub kind: EntryKind,
    /// Byte length for files, zero for directories.
    pub size: u64,
}

impl FileStat {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Path-keyed hierarchical storage.
///
/// All implementations must satisfy these invariants:
/// - Paths are absolute and `/`-separated; implementations normalize them.
/// - Every operation is a suspension point and may be interleaved with
///   operations on unrelated paths.
/// - `rmdir` fails with [`StoreError::NotEmpty`] unless the directory is
///   empty, and never removes the root.
/// - Missing entries are reported as [`StoreError::NotFound`].
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Metadata for the entry at `path`.
    async fn stat(&self, path: &str) -> StoreResult<FileStat>;

    /// Names of the direct children of the directory at `path`, sorted.
    async fn read_dir(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Contents of the file at `path`.
    async fn read_file(&self, path: &str) -> StoreResult<Vec<u8>>;

    /// Create or replace the file at `path`. The parent must exist.
    async fn write_file(&self, path: &str, data: &[u8]) -> StoreResult<()>;

    /// Create a directory. The parent must exist.
    async fn mkdir(&self, path: &str) -> StoreResult<()>;

    /// Remove a file.
    async fn unlink(&self, path: &str) -> StoreResult<()>;

    /// Remove an empty directory.
    async fn rmdir(&self, path: &str) -> StoreResult<()>;

    /// Returns `true` if any entry exists at `path`.
    async fn exists(&self, path: &str) -> StoreResult<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Contents of the file at `path` decoded as UTF-8.
    async fn read_to_string(&self, path: &str) -> StoreResult<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes).map_err(|_| StoreError::Encoding(path.to_string()))
    }

    /// Create `path` and every missing ancestor.
    async fn mkdir_all(&self, path: &str) -> StoreResult<()> {
        let normalized = path::normalize(path)?;
        let mut current = String::new();
        for part in normalized.split('/').filter(|p| !p.is_empty()) {
            current.push('/');
            current.push_str(part);
            match self.stat(&current).await {
                Ok(stat) if stat.is_dir() => continue,
                Ok(_) => return Err(StoreError::NotADirectory(current)),
                Err(StoreError::NotFound(_)) => match self.mkdir(&current).await {
                    Ok(()) | Err(StoreError::AlreadyExists(_)) => {}
                    Err(e) => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
