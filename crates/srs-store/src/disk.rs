use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::path::{self, ROOT};
use crate::traits::{EntryKind, FileStat, FileStore};

/// File store backed by a host directory.
///
/// The store's `/` maps onto `root`; every other path is resolved beneath
/// it. Normalization rejects `..`, so no path can escape the root.
#[derive(Clone, Debug)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    /// Open a store over an existing host directory.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        let meta = tokio::fs::metadata(&root)
            .await
            .map_err(|e| map_io(ROOT, e))?;
        if !meta.is_dir() {
            return Err(StoreError::NotADirectory(root.display().to_string()));
        }
        debug!(root = %root.display(), "opened disk file store");
        Ok(Self { root })
    }

    /// The host directory backing `/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, normalized: &str) -> PathBuf {
        let relative = normalized.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

fn map_io(path: &str, err: std::io::Error) -> StoreError {
    match err.kind() {
        ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
        ErrorKind::AlreadyExists => StoreError::AlreadyExists(path.to_string()),
        _ => StoreError::Io {
            path: path.to_string(),
            source: err,
        },
    }
}

#[async_trait]
impl FileStore for DiskFileStore {
    async fn stat(&self, path: &str) -> StoreResult<FileStat> {
        let path = path::normalize(path)?;
        let meta = tokio::fs::symlink_metadata(self.host_path(&path))
            .await
            .map_err(|e| map_io(&path, e))?;
        Ok(if meta.is_dir() {
            FileStat {
                kind: EntryKind::Directory,
                size: 0,
            }
        } else {
            FileStat {
                kind: EntryKind::File,
                size: meta.len(),
            }
        })
    }

    async fn read_dir(&self, path: &str) -> StoreResult<Vec<String>> {
        let path = path::normalize(path)?;
        if !self.stat(&path).await?.is_dir() {
            return Err(StoreError::NotADirectory(path));
        }
        let mut entries = tokio::fs::read_dir(self.host_path(&path))
            .await
            .map_err(|e| map_io(&path, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| map_io(&path, e))? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    return Err(StoreError::Encoding(format!(
                        "{}/{}",
                        path.trim_end_matches('/'),
                        raw.to_string_lossy()
                    )))
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_file(&self, path: &str) -> StoreResult<Vec<u8>> {
        let path = path::normalize(path)?;
        if self.stat(&path).await?.is_dir() {
            return Err(StoreError::IsADirectory(path));
        }
        tokio::fs::read(self.host_path(&path))
            .await
            .map_err(|e| map_io(&path, e))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let parent = path::parent(&path).ok_or_else(|| StoreError::InvalidPath {
            path: path.clone(),
            reason: "the root has no parent".into(),
        })?;
        if !self.stat(parent).await?.is_dir() {
            return Err(StoreError::NotADirectory(parent.to_string()));
        }
        if matches!(self.stat(&path).await, Ok(stat) if stat.is_dir()) {
            return Err(StoreError::IsADirectory(path));
        }
        tokio::fs::write(self.host_path(&path), data)
            .await
            .map_err(|e| map_io(&path, e))
    }

    async fn mkdir(&self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path)?;
        if path == ROOT {
            return Err(StoreError::AlreadyExists(path));
        }
        tokio::fs::create_dir(self.host_path(&path))
            .await
            .map_err(|e| map_io(&path, e))
    }

    async fn unlink(&self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path)?;
        if self.stat(&path).await?.is_dir() {
            return Err(StoreError::IsADirectory(path));
        }
        tokio::fs::remove_file(self.host_path(&path))
            .await
            .map_err(|e| map_io(&path, e))
    }

    async fn rmdir(&self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path)?;
        if path == ROOT {
            return Err(StoreError::InvalidPath {
                path,
                reason: "the root cannot be removed".into(),
            });
        }
        if !self.stat(&path).await?.is_dir() {
            return Err(StoreError::NotADirectory(path));
        }
        if !self.read_dir(&path).await?.is_empty() {
            return Err(StoreError::NotEmpty(path));
        }
        tokio::fs::remove_dir(self.host_path(&path))
            .await
            .map_err(|e| map_io(&path, e))
    }
}
