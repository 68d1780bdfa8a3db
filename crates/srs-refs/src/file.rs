//! Refs stored as small text files inside a [`FileStore`].
//!
//! A ref named `refs/heads/main` in a repository whose metadata directory is
//! `/site/.git` lives at `/site/.git/refs/heads/main` and contains either a
//! commit id or `ref: <target>`, newline-terminated.

use async_trait::async_trait;
use srs_store::{path, FileStore, StoreError};
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_ref_name;
use crate::traits::RefStore;
use crate::types::RefValue;

/// A [`RefStore`] over a borrowed file store.
pub struct FileRefStore<'a> {
    files: &'a dyn FileStore,
    git_dir: String,
}

impl<'a> FileRefStore<'a> {
    /// Refs rooted at `git_dir` (the repository's metadata directory).
    pub fn new(files: &'a dyn FileStore, git_dir: impl Into<String>) -> Self {
        Self {
            files,
            git_dir: git_dir.into(),
        }
    }

    pub fn git_dir(&self) -> &str {
        &self.git_dir
    }

    fn file_for(&self, name: &str) -> String {
        path::join(&self.git_dir, name)
    }
}

#[async_trait]
impl<'a> RefStore for FileRefStore<'a> {
    async fn read_ref(&self, name: &str) -> Result<Option<RefValue>> {
        if validate_ref_name(name).is_err() {
            return Ok(None);
        }
        match self.files.read_to_string(&self.file_for(name)).await {
            Ok(content) => RefValue::parse(name, &content).map(Some),
            Err(StoreError::NotFound(_)) | Err(StoreError::IsADirectory(_)) => Ok(None),
            // A path component is a file: `refs/heads/a` blocks `refs/heads/a/b`.
            Err(StoreError::NotADirectory(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_ref(&self, name: &str, value: &RefValue, force: bool) -> Result<()> {
        validate_ref_name(name)?;
        let file = self.file_for(name);
        if !force && self.files.exists(&file).await? {
            return Err(RefError::AlreadyExists {
                name: name.to_string(),
            });
        }
        if let Some(parent) = path::parent(&file) {
            self.files.mkdir_all(parent).await?;
        }
        self.files
            .write_file(&file, value.to_stored().as_bytes())
            .await?;
        debug!(git_dir = %self.git_dir, name, value = %value, "wrote ref");
        Ok(())
    }

    async fn delete_ref(&self, name: &str) -> Result<bool> {
        validate_ref_name(name)?;
        match self.files.unlink(&self.file_for(name)).await {
            Ok(()) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_refs(&self, prefix: &str) -> Result<Vec<(String, RefValue)>> {
        // Start the walk at the deepest directory named by the prefix.
        let start = match prefix.rsplit_once('/') {
            Some((dir, _)) => dir.to_string(),
            None => String::new(),
        };
        let mut pending = vec![start];
        let mut found = Vec::new();

        while let Some(dir) = pending.pop() {
            let host_dir = if dir.is_empty() {
                self.git_dir.clone()
            } else {
                self.file_for(&dir)
            };
            let names = match self.files.read_dir(&host_dir).await {
                Ok(names) => names,
                Err(StoreError::NotFound(_)) | Err(StoreError::NotADirectory(_)) => continue,
                Err(e) => return Err(e.into()),
            };
            for entry in names {
                let name = if dir.is_empty() {
                    entry
                } else {
                    format!("{dir}/{entry}")
                };
                if self.files.stat(&self.file_for(&name)).await?.is_dir() {
                    if name.starts_with(prefix) || prefix.starts_with(&format!("{name}/")) {
                        pending.push(name);
                    }
                } else if name.starts_with(prefix) {
                    if let Some(value) = self.read_ref(&name).await? {
                        found.push((name, value));
                    }
                }
            }
        }

        found.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(found)
    }
}

impl std::fmt::Debug for FileRefStore<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRefStore")
            .field("git_dir", &self.git_dir)
            .finish()
    }
}
