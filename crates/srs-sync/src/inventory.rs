//! Read-only views of the repositories under the storage root.

use serde::{Deserialize, Serialize};
use srs_backend::{BackendError, LogOptions};
use srs_refs::{branch_ref, DEFAULT_POINTER};
use srs_store::path;
use srs_types::{Commit, CommitId};

use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};

const ENTRY_PAGE: &str = "index.html";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub path: String,
    pub origin_url: Option<String>,
    /// `None` when HEAD is detached.
    pub current_branch: Option<String>,
    pub head_commit: Option<CommitId>,
    pub branches: Vec<String>,
    /// Whether the working tree has an `index.html`.
    pub has_entry_page: bool,
}

/// One line of a branch history listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub oid: CommitId,
    pub short_id: String,
    pub subject: String,
    pub timestamp: i64,
    pub signed: bool,
}

impl From<&Commit> for CommitSummary {
    fn from(commit: &Commit) -> Self {
        Self {
            oid: commit.oid.clone(),
            short_id: commit.oid.short().to_string(),
            subject: commit.subject().to_string(),
            timestamp: commit.author.timestamp,
            signed: commit.is_signed(),
        }
    }
}

impl SyncEngine {
    /// Names of the non-empty directories directly under the storage root.
    pub async fn list_repositories(&self) -> SyncResult<Vec<String>> {
        let root = path::normalize(&self.config.storage_root)?;
        if !self.files.exists(&root).await? {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for name in self.files.read_dir(&root).await? {
            let entry = path::join(&root, &name);
            if self.files.stat(&entry).await?.is_dir()
                && !self.files.read_dir(&entry).await?.is_empty()
            {
                names.push(name);
            }
        }
        Ok(names)
    }

    pub async fn describe(&self, path: &str) -> SyncResult<RepositoryInfo> {
        let path = self.require_repository(path).await?;
        let head_commit = match self.backend.resolve_ref(&path, DEFAULT_POINTER).await {
            Ok(oid) => Some(oid),
            Err(BackendError::UnknownRevision { .. }) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(RepositoryInfo {
            name: path::file_name(&path).unwrap_or_default().to_string(),
            origin_url: self.origin_url(&path).await?,
            current_branch: self.backend.current_branch(&path).await?,
            head_commit,
            branches: self.list_branches(&path).await?,
            has_entry_page: self.files.exists(&path::join(&path, ENTRY_PAGE)).await?,
            path,
        })
    }

    /// Local branches of `path`.
    pub async fn list_branches(&self, path: &str) -> SyncResult<Vec<String>> {
        let path = self.require_repository(path).await?;
        Ok(self
            .backend
            .list_branches(&path, None)
            .await?
            .into_iter()
            .filter(|b| b != DEFAULT_POINTER)
            .collect())
    }

    /// History of a local branch, newest first.
    pub async fn list_commits(&self, path: &str, branch: &str) -> SyncResult<Vec<CommitSummary>> {
        let path = self.require_repository(path).await?;
        let commits = match self
            .backend
            .log(&path, &branch_ref(branch), &LogOptions::default())
            .await
        {
            Ok(commits) => commits,
            Err(BackendError::UnknownRevision { .. }) => {
                return Err(SyncError::NotFound(format!("branch {branch} in {path}")))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(commits.iter().map(CommitSummary::from).collect())
    }
}
