//! The synchronization engine: clone, fetch, checkout and delete.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use srs_backend::{
    BackendError, CloneOptions, FetchOptions, LogOptions, RepositoryBackend,
};
use srs_crypto::SignatureVerifier;
use srs_refs::{branch_ref, remote_ref, DEFAULT_POINTER};
use srs_store::{path, FileStore};
use srs_trust::TrustStore;
use srs_types::{local_path, CommitId};
use tracing::{debug, info, warn};

use crate::anchor::{AnchorResolver, DefaultAnchorResolver};
use crate::config::{SyncConfig, TrustAnchor};
use crate::delete::remove_tree;
use crate::error::{SyncError, SyncResult};
use crate::trust::TrustPins;
use crate::types::{
    BranchReport, BranchStatus, CheckoutReport, CloneReport, FetchReport, Removal,
};
use crate::validate::CommitValidator;

const NO_TRACKING_REF: &str = "no remote-tracking ref";

/// Drives a [`RepositoryBackend`] so that only signed history is accepted.
///
/// Callers must serialize operations on the same repository path; the
/// engine takes no locks of its own.
pub struct SyncEngine {
    pub(crate) backend: Arc<dyn RepositoryBackend>,
    pub(crate) files: Arc<dyn FileStore>,
    verifier: Arc<dyn SignatureVerifier>,
    pins: TrustPins,
    anchors: Arc<dyn AnchorResolver>,
    pub(crate) config: SyncConfig,
}

impl SyncEngine {
    /// Build an engine. `files` must be the store `backend` materializes
    /// repositories into.
    pub fn new(
        backend: Arc<dyn RepositoryBackend>,
        files: Arc<dyn FileStore>,
        verifier: Arc<dyn SignatureVerifier>,
        trust: Arc<dyn TrustStore>,
        config: SyncConfig,
    ) -> SyncResult<Self> {
        config.validate()?;
        let anchors = Arc::new(DefaultAnchorResolver::new(&config)?);
        Ok(Self {
            backend,
            files,
            verifier,
            pins: TrustPins::new(trust),
            anchors,
            config,
        })
    }

    /// Replace the resolver used to turn trust anchors into keys.
    pub fn with_anchor_resolver(mut self, anchors: Arc<dyn AnchorResolver>) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn pins(&self) -> &TrustPins {
        &self.pins
    }

    /// Where a clone of `url` lives.
    pub fn local_path(&self, url: &str) -> SyncResult<String> {
        Ok(local_path(&self.config.storage_root, url)?)
    }

    async fn with_timeout<T, E, F>(&self, operation: &'static str, fut: F) -> SyncResult<T>
    where
        F: Future<Output = Result<T, E>>,
        SyncError: From<E>,
    {
        let after = self.config.network_timeout();
        match tokio::time::timeout(after, fut).await {
            Ok(result) => result.map_err(SyncError::from),
            Err(_) => {
                warn!(operation, ?after, "network operation timed out");
                Err(SyncError::Timeout { operation, after })
            }
        }
    }

    /// Clone `url` and accept it only if every commit on every branch
    /// verifies against the key behind `anchor`.
    ///
    /// Falls back to the configured default anchor. Whatever existed at the
    /// local path beforehand is discarded. On any failure the local path is
    /// removed and no key stays pinned for `url`.
    pub async fn clone_repo(
        &self,
        url: &str,
        anchor: Option<&TrustAnchor>,
    ) -> SyncResult<CloneReport> {
        let anchor = anchor
            .or(self.config.default_trust_anchor.as_ref())
            .ok_or_else(|| {
                SyncError::Config("no trust anchor given and no default configured".into())
            })?;
        let local_path = self.local_path(url)?;
        info!(url, path = %local_path, "clone started");

        let root = &self.config.storage_root;
        if let Removal::Removed { entries } = remove_tree(&*self.files, root, &local_path).await? {
            debug!(path = %local_path, entries, "discarded previous contents");
        }

        match self.clone_and_validate(url, &local_path, anchor).await {
            Ok(report) => {
                info!(
                    url,
                    path = %local_path,
                    branches = report.branches.len(),
                    head = %report.head.short(),
                    "clone accepted"
                );
                Ok(report)
            }
            Err(err) => {
                if err.is_signature_failure() {
                    warn!(url, path = %local_path, error = %err, "untrusted history, removing local copy");
                } else {
                    warn!(url, path = %local_path, error = %err, "clone failed, removing local copy");
                }
                if let Err(cleanup) = remove_tree(&*self.files, root, &local_path).await {
                    warn!(path = %local_path, error = %cleanup, "cleanup after failed clone failed");
                }
                if let Err(cleanup) = self.pins.forget(url).await {
                    warn!(url, error = %cleanup, "could not drop trust pin after failed clone");
                }
                Err(err)
            }
        }
    }

    async fn clone_and_validate(
        &self,
        url: &str,
        local_path: &str,
        anchor: &TrustAnchor,
    ) -> SyncResult<CloneReport> {
        let options = CloneOptions {
            single_branch: false,
            depth: None,
            proxy: self.config.proxy.clone(),
            remote_name: Some(self.config.remote_name.clone()),
        };
        self.with_timeout("clone", self.backend.clone_repo(url, local_path, &options))
            .await?;

        let armored = self
            .with_timeout("trust anchor", self.anchors.resolve(anchor))
            .await?;
        let validator = CommitValidator::new(&*self.verifier, &armored).await?;

        let remote = self.remote_for_url(local_path, url).await?;
        let branches: Vec<String> = self
            .backend
            .list_branches(local_path, Some(&remote))
            .await?
            .into_iter()
            .filter(|b| b != DEFAULT_POINTER)
            .collect();

        let mut verified = HashSet::new();
        let mut newest: Option<(i64, CommitId)> = None;
        for branch in &branches {
            self.backend.checkout(local_path, branch).await?;
            let history = self
                .backend
                .log(local_path, &branch_ref(branch), &LogOptions::default())
                .await?;
            debug!(branch = %branch, commits = history.len(), "validating branch history");

            // Oldest first.
            for commit in history.iter().rev() {
                if !verified.insert(commit.oid.clone()) {
                    continue;
                }
                let record = self.backend.read_commit(local_path, &commit.oid).await?;
                validator.validate(&record).await?;
                let timestamp = record.timestamp();
                if newest.as_ref().map_or(true, |(best, _)| timestamp > *best) {
                    newest = Some((timestamp, record.commit.oid));
                }
            }
        }

        let (_, head) = newest.ok_or_else(|| SyncError::EmptyHistory(url.to_string()))?;
        self.backend.checkout(local_path, head.as_str()).await?;

        if let Some(previous) = self.pins.pin(url, &armored).await? {
            if previous != armored {
                warn!(url, key = %validator.key_id(), "replaced a different pinned key");
            }
        }

        Ok(CloneReport {
            url: url.to_string(),
            local_path: local_path.to_string(),
            branches,
            head,
            key_id: validator.key_id().to_string(),
        })
    }

    /// The remote of `path` that points at `url`, or the configured remote.
    async fn remote_for_url(&self, path: &str, url: &str) -> SyncResult<String> {
        Ok(self
            .backend
            .list_remotes(path)
            .await?
            .into_iter()
            .find(|r| r.url == url)
            .map(|r| r.name)
            .unwrap_or_else(|| self.config.remote_name.clone()))
    }

    /// Existing repository directory at `path`, normalized.
    pub(crate) async fn require_repository(&self, path: &str) -> SyncResult<String> {
        let path = path::normalize(path)?;
        if !self.files.exists(&path).await? {
            return Err(SyncError::NotFound(format!("repository {path}")));
        }
        Ok(path)
    }

    /// URL of the configured remote of `path`, if recorded.
    pub(crate) async fn origin_url(&self, path: &str) -> SyncResult<Option<String>> {
        Ok(self
            .backend
            .list_remotes(path)
            .await?
            .into_iter()
            .find(|r| r.name == self.config.remote_name)
            .map(|r| r.url))
    }

    /// Bring the local branches of `path` up to date with the remote.
    ///
    /// Requires a key pinned by an earlier clone. Each local branch moves
    /// only if every commit it would newly reach verifies; branches are
    /// judged independently and a rejected branch keeps its old pointer.
    pub async fn fetch(&self, path: &str) -> SyncResult<FetchReport> {
        let path = self.require_repository(path).await?;
        let url = self.origin_url(&path).await?.ok_or_else(|| {
            SyncError::NotFound(format!(
                "remote {} of repository {path}",
                self.config.remote_name
            ))
        })?;
        let armored = match self.pins.lookup(&url).await? {
            Some(armored) => armored,
            None => {
                warn!(url = %url, path = %path, "refusing to fetch without a pinned key");
                return Err(SyncError::UnpinnedTrust { url });
            }
        };
        let validator = CommitValidator::new(&*self.verifier, &armored).await?;

        let options = FetchOptions {
            single_branch: false,
            tags: true,
            prune: true,
            proxy: self.config.proxy.clone(),
        };
        self.with_timeout("fetch", self.backend.fetch(&path, &url, &options))
            .await?;

        let branches: Vec<String> = self
            .backend
            .list_branches(&path, None)
            .await?
            .into_iter()
            .filter(|b| b != DEFAULT_POINTER)
            .collect();
        let reports = join_all(
            branches
                .iter()
                .map(|branch| self.examine_branch(&path, branch, &validator)),
        )
        .await;

        let report = FetchReport::from_branches(reports);
        info!(
            path = %path,
            updated = report.any_branch_updated,
            new_commits = report.any_new_commits,
            "fetch finished"
        );
        Ok(report)
    }

    async fn examine_branch(
        &self,
        path: &str,
        branch: &str,
        validator: &CommitValidator<'_>,
    ) -> BranchReport {
        let (new_commits, status) = match self.update_branch(path, branch, validator).await {
            Ok(outcome) => outcome,
            Err(err) => (
                0,
                BranchStatus::Rejected {
                    commit: None,
                    reason: err.to_string(),
                },
            ),
        };
        match &status {
            BranchStatus::UpToDate => debug!(branch, "branch up to date"),
            BranchStatus::Updated { from, to } => {
                info!(branch, from = %from.short(), to = %to.short(), new_commits, "branch updated")
            }
            BranchStatus::Rejected { commit, reason } => {
                warn!(branch, commit = ?commit, %reason, "branch update rejected")
            }
        }
        BranchReport {
            branch: branch.to_string(),
            new_commits,
            status,
        }
    }

    async fn update_branch(
        &self,
        path: &str,
        branch: &str,
        validator: &CommitValidator<'_>,
    ) -> SyncResult<(usize, BranchStatus)> {
        let local_ref = branch_ref(branch);
        let tracking_ref = remote_ref(&self.config.remote_name, branch);

        let local = self.backend.resolve_ref(path, &local_ref).await?;
        let remote = match self.backend.resolve_ref(path, &tracking_ref).await {
            Ok(oid) => oid,
            Err(BackendError::UnknownRevision { .. }) => {
                return Ok((
                    0,
                    BranchStatus::Rejected {
                        commit: None,
                        reason: NO_TRACKING_REF.into(),
                    },
                ))
            }
            Err(e) => return Err(e.into()),
        };
        if local == remote {
            return Ok((0, BranchStatus::UpToDate));
        }

        let options = LogOptions {
            depth: None,
            since: Some(local_ref.clone()),
        };
        let new_commits = self.backend.log(path, &tracking_ref, &options).await?;
        for commit in new_commits.iter().rev() {
            let record = self.backend.read_commit(path, &commit.oid).await?;
            if let Err(err) = validator.validate(&record).await {
                return Ok((
                    new_commits.len(),
                    BranchStatus::Rejected {
                        commit: Some(commit.oid.clone()),
                        reason: err.to_string(),
                    },
                ));
            }
        }

        // Local is a replica: divergent local history is superseded.
        self.backend
            .write_ref(path, &local_ref, &remote, true)
            .await?;
        Ok((
            new_commits.len(),
            BranchStatus::Updated {
                from: local,
                to: remote,
            },
        ))
    }

    /// Check out `branch`, then `commit` if given (leaving HEAD detached).
    ///
    /// `branch` must be a local or remote-tracking branch of `path`.
    pub async fn checkout(
        &self,
        path: &str,
        branch: &str,
        commit: Option<&CommitId>,
    ) -> SyncResult<CheckoutReport> {
        let path = self.require_repository(path).await?;
        if !self.is_known_branch(&path, branch).await? {
            return Err(SyncError::NotFound(format!("branch {branch} in {path}")));
        }

        self.backend.checkout(&path, branch).await?;
        let report = match commit {
            Some(oid) => {
                self.backend.checkout(&path, oid.as_str()).await?;
                CheckoutReport {
                    branch: branch.to_string(),
                    commit: oid.clone(),
                    detached: true,
                }
            }
            None => CheckoutReport {
                branch: branch.to_string(),
                commit: self.backend.resolve_ref(&path, &branch_ref(branch)).await?,
                detached: false,
            },
        };
        info!(
            path = %path,
            branch,
            commit = %report.commit.short(),
            detached = report.detached,
            "checked out"
        );
        Ok(report)
    }

    async fn is_known_branch(&self, path: &str, branch: &str) -> SyncResult<bool> {
        if branch == DEFAULT_POINTER {
            return Ok(false);
        }
        if self
            .backend
            .list_branches(path, None)
            .await?
            .iter()
            .any(|b| b == branch)
        {
            return Ok(true);
        }
        Ok(self
            .backend
            .list_branches(path, Some(&self.config.remote_name))
            .await?
            .iter()
            .any(|b| b == branch))
    }

    /// Remove a repository's files. The trust pin for its URL is kept, so a
    /// later clone of the same URL can detect a key change. The storage root
    /// and its ancestors are refused.
    pub async fn delete_repo(&self, path: &str) -> SyncResult<Removal> {
        let removal = remove_tree(&*self.files, &self.config.storage_root, path).await?;
        info!(path, outcome = ?removal, "repository deleted");
        Ok(removal)
    }

    /// Remove every directory directly under the storage root, returning
    /// their names. Plain files at the root are left alone.
    pub async fn delete_all(&self) -> SyncResult<Vec<String>> {
        let root = path::normalize(&self.config.storage_root)?;
        if !self.files.exists(&root).await? {
            return Ok(Vec::new());
        }
        let mut removed = Vec::new();
        for name in self.files.read_dir(&root).await? {
            let entry = path::join(&root, &name);
            if !self.files.stat(&entry).await?.is_dir() {
                continue;
            }
            if let Removal::Removed { .. } = remove_tree(&*self.files, &root, &entry).await? {
                removed.push(name);
            }
        }
        info!(count = removed.len(), "deleted all repositories");
        Ok(removed)
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
