use async_trait::async_trait;
use srs_types::{Commit, CommitId, CommitRecord};

use crate::error::BackendResult;
use crate::options::{CloneOptions, FetchOptions, LogOptions, Remote};

/// Version-control operations over a local repository directory.
///
/// `path` is always the repository's directory in the shared file store.
/// Revisions (`rev`) accept full ref names, short branch names,
/// `remote/branch` names, tags and literal commit ids.
#[async_trait]
pub trait RepositoryBackend: Send + Sync {
    /// Clone `url` into `path`, leaving HEAD on the remote's default branch.
    async fn clone_repo(&self, url: &str, path: &str, options: &CloneOptions) -> BackendResult<()>;

    /// Update remote-tracking refs of `path` from `url`.
    async fn fetch(&self, path: &str, url: &str, options: &FetchOptions) -> BackendResult<()>;

    /// Branch short names: local when `remote` is `None`, otherwise the
    /// remote-tracking branches of that remote (including its `HEAD`
    /// pseudo-branch). Sorted.
    async fn list_branches(&self, path: &str, remote: Option<&str>) -> BackendResult<Vec<String>>;

    async fn list_remotes(&self, path: &str) -> BackendResult<Vec<Remote>>;

    /// History reachable from `rev`, newest first.
    async fn log(&self, path: &str, rev: &str, options: &LogOptions) -> BackendResult<Vec<Commit>>;

    /// A commit together with the payload its signature covers.
    async fn read_commit(&self, path: &str, oid: &CommitId) -> BackendResult<CommitRecord>;

    /// Check out a branch (attaching HEAD) or a commit (detaching HEAD).
    async fn checkout(&self, path: &str, rev: &str) -> BackendResult<()>;

    async fn resolve_ref(&self, path: &str, rev: &str) -> BackendResult<CommitId>;

    /// Point the full ref `name` at `value`.
    async fn write_ref(
        &self,
        path: &str,
        name: &str,
        value: &CommitId,
        force: bool,
    ) -> BackendResult<()>;

    /// The branch HEAD is attached to, or `None` when detached.
    async fn current_branch(&self, path: &str) -> BackendResult<Option<String>>;
}
