//! The [`RefStore`] trait defining the reference storage interface.

use async_trait::async_trait;
use srs_types::CommitId;

use crate::error::{RefError, Result};
use crate::names::{branch_ref, DEFAULT_POINTER};
use crate::types::{Head, RefValue};

/// Maximum number of symbolic hops followed by [`RefStore::resolve`].
pub const MAX_SYMBOLIC_DEPTH: usize = 5;

/// Storage backend for named references of one repository.
///
/// The namespace follows a hierarchical layout:
///
/// - `HEAD` for the current branch or detached commit
/// - `refs/heads/*` for local branches
/// - `refs/remotes/{remote}/*` for remote-tracking refs
/// - `refs/tags/*` for tags
#[async_trait]
pub trait RefStore: Send + Sync {
    /// Read a ref by its full name. Returns `Ok(None)` if it does not exist.
    async fn read_ref(&self, name: &str) -> Result<Option<RefValue>>;

    /// Create or update a ref. Without `force`, an existing ref is an error.
    async fn write_ref(&self, name: &str, value: &RefValue, force: bool) -> Result<()>;

    /// Delete a ref. Returns `Ok(false)` if it did not exist.
    async fn delete_ref(&self, name: &str) -> Result<bool>;

    /// All refs whose full name starts with `prefix`, sorted by name.
    async fn list_refs(&self, prefix: &str) -> Result<Vec<(String, RefValue)>>;

    /// Follow symbolic refs from `name` down to a commit.
    async fn resolve(&self, name: &str) -> Result<CommitId> {
        let mut current = name.to_string();
        for _ in 0..=MAX_SYMBOLIC_DEPTH {
            match self.read_ref(&current).await? {
                Some(RefValue::Direct(oid)) => return Ok(oid),
                Some(RefValue::Symbolic(target)) => current = target,
                None => return Err(RefError::NotFound { name: current }),
            }
        }
        Err(RefError::SymbolicLoop {
            name: name.to_string(),
        })
    }

    /// Resolve a user-facing revision: a full ref name, a local branch, a
    /// remote-tracking ref (`origin/main`), a tag, or a literal commit id.
    async fn resolve_revision(&self, rev: &str) -> Result<CommitId> {
        let candidates = [
            rev.to_string(),
            format!("refs/heads/{rev}"),
            format!("refs/remotes/{rev}"),
            format!("refs/tags/{rev}"),
        ];
        for candidate in &candidates {
            if self.read_ref(candidate).await?.is_some() {
                return self.resolve(candidate).await;
            }
        }
        CommitId::parse(rev).map_err(|_| RefError::NotFound {
            name: rev.to_string(),
        })
    }

    /// Read the current HEAD state. Returns `Ok(None)` if HEAD is unset.
    async fn head(&self) -> Result<Option<Head>> {
        Ok(match self.read_ref(DEFAULT_POINTER).await? {
            None => None,
            Some(RefValue::Direct(oid)) => Some(Head::Detached(oid)),
            Some(RefValue::Symbolic(target)) => match target.strip_prefix("refs/heads/") {
                Some(branch) => Some(Head::Attached(branch.to_string())),
                None => {
                    return Err(RefError::Malformed {
                        name: DEFAULT_POINTER.to_string(),
                        content: target,
                    })
                }
            },
        })
    }

    /// Attach HEAD to a local branch.
    async fn set_head(&self, branch: &str) -> Result<()> {
        self.write_ref(DEFAULT_POINTER, &RefValue::Symbolic(branch_ref(branch)), true)
            .await
    }

    /// Detach HEAD at a commit.
    async fn set_head_detached(&self, oid: &CommitId) -> Result<()> {
        self.write_ref(DEFAULT_POINTER, &RefValue::Direct(oid.clone()), true)
            .await
    }

    /// Short names of all refs directly under `prefix` (e.g. `refs/heads/`).
    async fn short_names(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .list_refs(prefix)
            .await?
            .into_iter()
            .filter_map(|(name, _)| name.strip_prefix(prefix).map(str::to_string))
            .collect())
    }
}
