//! In-process repository backend.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use srs_refs::{
    branch_ref, remote_ref, tag_ref, FileRefStore, RefError, RefStore, RefValue, DEFAULT_POINTER,
};
use srs_store::{path, FileStore, StoreError};
use srs_types::{Commit, CommitId, CommitRecord};
use tracing::{debug, info};

use crate::error::{BackendError, BackendResult};
use crate::layout::{self, RepoConfig, GIT_DIR};
use crate::options::{CloneOptions, FetchOptions, LogOptions, Remote};
use crate::remote::{RemoteRepository, StoredObject};
use crate::traits::RepositoryBackend;

const DEFAULT_REMOTE: &str = "origin";

/// A [`RepositoryBackend`] that hosts remotes in memory and materializes
/// local repositories into a shared [`FileStore`].
///
/// Clone and fetch are the only operations that "touch the network"; they
/// are counted by [`network_calls`](Self::network_calls), can be slowed down
/// with [`set_latency`](Self::set_latency) and fail for URLs marked
/// offline.
pub struct MemoryBackend {
    files: Arc<dyn FileStore>,
    remotes: RwLock<HashMap<String, RemoteRepository>>,
    offline: RwLock<HashSet<String>>,
    latency: RwLock<Option<Duration>>,
    network_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self {
            files,
            remotes: RwLock::new(HashMap::new()),
            offline: RwLock::new(HashSet::new()),
            latency: RwLock::new(None),
            network_calls: AtomicUsize::new(0),
        }
    }

    /// Delay every network operation by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = RwLock::new(Some(latency));
        self
    }

    /// Change the delay of later network operations; `None` removes it.
    pub fn set_latency(&self, latency: Option<Duration>) -> BackendResult<()> {
        *self.latency.write().map_err(|_| BackendError::LockPoisoned)? = latency;
        Ok(())
    }

    pub fn files(&self) -> &Arc<dyn FileStore> {
        &self.files
    }

    /// Serve `repo` at `url`, replacing whatever was hosted there.
    pub fn host(&self, url: impl Into<String>, repo: RemoteRepository) -> BackendResult<()> {
        let mut remotes = self.remotes.write().map_err(|_| BackendError::LockPoisoned)?;
        remotes.insert(url.into(), repo);
        Ok(())
    }

    /// Mutate the repository hosted at `url`.
    pub fn update_remote<R>(
        &self,
        url: &str,
        f: impl FnOnce(&mut RemoteRepository) -> R,
    ) -> BackendResult<R> {
        let mut remotes = self.remotes.write().map_err(|_| BackendError::LockPoisoned)?;
        let repo = remotes.get_mut(url).ok_or_else(|| BackendError::UnknownRemote {
            url: url.to_string(),
        })?;
        Ok(f(repo))
    }

    /// Make network operations against `url` fail (or succeed again).
    pub fn set_offline(&self, url: &str, offline: bool) -> BackendResult<()> {
        let mut set = self.offline.write().map_err(|_| BackendError::LockPoisoned)?;
        if offline {
            set.insert(url.to_string());
        } else {
            set.remove(url);
        }
        Ok(())
    }

    /// Number of clone and fetch calls made so far.
    pub fn network_calls(&self) -> usize {
        self.network_calls.load(Ordering::SeqCst)
    }

    fn refs(&self, repo: &str) -> FileRefStore<'_> {
        FileRefStore::new(&*self.files, layout::git_dir(repo))
    }

    /// Reach out to the remote: count the call, apply latency, and take a
    /// snapshot of the hosted repository.
    async fn contact(&self, url: &str) -> BackendResult<RemoteRepository> {
        self.network_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.read().map_err(|_| BackendError::LockPoisoned)?;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let offline = self
            .offline
            .read()
            .map_err(|_| BackendError::LockPoisoned)?
            .contains(url);
        if offline {
            return Err(BackendError::Network {
                url: url.to_string(),
                reason: "remote unreachable".into(),
            });
        }
        let remotes = self.remotes.read().map_err(|_| BackendError::LockPoisoned)?;
        remotes
            .get(url)
            .cloned()
            .ok_or_else(|| BackendError::UnknownRemote {
                url: url.to_string(),
            })
    }

    async fn read_config(&self, repo: &str) -> BackendResult<RepoConfig> {
        let file = layout::config_file(repo);
        let text = match self.files.read_to_string(&file).await {
            Ok(text) => text,
            Err(StoreError::NotFound(_)) | Err(StoreError::NotADirectory(_)) => {
                return Err(BackendError::NotARepository(repo.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text).map_err(|e| BackendError::Corrupt {
            path: file,
            reason: e.to_string(),
        })
    }

    async fn write_config(&self, repo: &str, config: &RepoConfig) -> BackendResult<()> {
        let file = layout::config_file(repo);
        let json = serde_json::to_vec_pretty(config).map_err(|e| BackendError::Corrupt {
            path: file.clone(),
            reason: e.to_string(),
        })?;
        self.files.write_file(&file, &json).await?;
        Ok(())
    }

    async fn load_object(&self, repo: &str, oid: &CommitId) -> BackendResult<Option<StoredObject>> {
        let file = layout::object_file(repo, oid);
        let text = match self.files.read_to_string(&file).await {
            Ok(text) => text,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| BackendError::Corrupt {
                path: file,
                reason: e.to_string(),
            })
    }

    async fn store_objects(
        &self,
        repo: &str,
        objects: &[(CommitId, StoredObject)],
    ) -> BackendResult<usize> {
        self.files.mkdir_all(&layout::objects_dir(repo)).await?;
        let mut written = 0;
        for (oid, object) in objects {
            let file = layout::object_file(repo, oid);
            if self.files.exists(&file).await? {
                continue;
            }
            let json = serde_json::to_vec(object).map_err(|e| BackendError::Corrupt {
                path: file.clone(),
                reason: e.to_string(),
            })?;
            self.files.write_file(&file, &json).await?;
            written += 1;
        }
        Ok(written)
    }

    /// Copy objects and remote-tracking refs for the selected branches.
    async fn mirror(
        &self,
        repo: &str,
        remote_name: &str,
        remote: &RemoteRepository,
        single_branch: bool,
        tags: bool,
        depth: Option<usize>,
    ) -> BackendResult<Vec<String>> {
        let selected: Vec<(&String, &CommitId)> = remote
            .branches()
            .iter()
            .filter(|(name, _)| !single_branch || name.as_str() == remote.default_branch())
            .collect();

        let objects = remote.reachable(selected.iter().map(|(_, oid)| *oid), depth);
        let written = self.store_objects(repo, &objects).await?;

        let refs = self.refs(repo);
        for (name, oid) in &selected {
            refs.write_ref(
                &remote_ref(remote_name, name),
                &RefValue::Direct((*oid).clone()),
                true,
            )
            .await?;
        }
        if selected
            .iter()
            .any(|(name, _)| name.as_str() == remote.default_branch())
        {
            refs.write_ref(
                &remote_ref(remote_name, DEFAULT_POINTER),
                &RefValue::Symbolic(remote_ref(remote_name, remote.default_branch())),
                true,
            )
            .await?;
        }
        if tags {
            for (name, oid) in remote.tags() {
                if self.load_object(repo, oid).await?.is_some() {
                    refs.write_ref(&tag_ref(name), &RefValue::Direct(oid.clone()), true)
                        .await?;
                }
            }
        }

        debug!(
            repo,
            remote = remote_name,
            branches = selected.len(),
            objects = written,
            "mirrored remote"
        );
        Ok(selected.into_iter().map(|(name, _)| name.clone()).collect())
    }

    async fn ancestry(&self, repo: &str, tip: &CommitId) -> BackendResult<HashSet<CommitId>> {
        let mut seen = HashSet::new();
        let mut pending = vec![tip.clone()];
        while let Some(oid) = pending.pop() {
            if !seen.insert(oid.clone()) {
                continue;
            }
            if let Some(object) = self.load_object(repo, &oid).await? {
                pending.extend(object.body.parents);
            }
        }
        Ok(seen)
    }

    /// Remove every working-tree entry of `repo`, keeping the metadata dir.
    async fn clear_tree(&self, repo: &str) -> BackendResult<()> {
        // Pre-order listing; removing it in reverse visits children first.
        let mut entries = Vec::new();
        let mut pending: Vec<String> = self
            .files
            .read_dir(repo)
            .await?
            .into_iter()
            .filter(|name| name != GIT_DIR)
            .map(|name| path::join(repo, &name))
            .collect();
        while let Some(entry) = pending.pop() {
            let is_dir = self.files.stat(&entry).await?.is_dir();
            if is_dir {
                for child in self.files.read_dir(&entry).await? {
                    pending.push(path::join(&entry, &child));
                }
            }
            entries.push((entry, is_dir));
        }
        for (entry, is_dir) in entries.into_iter().rev() {
            if is_dir {
                self.files.rmdir(&entry).await?;
            } else {
                self.files.unlink(&entry).await?;
            }
        }
        Ok(())
    }

    async fn write_tree(&self, repo: &str, object: &StoredObject) -> BackendResult<()> {
        self.clear_tree(repo).await?;
        for (relative, contents) in &object.body.files {
            let target = path::normalize(&path::join(repo, relative))?;
            if let Some(parent) = path::parent(&target) {
                self.files.mkdir_all(parent).await?;
            }
            self.files.write_file(&target, contents.as_bytes()).await?;
        }
        Ok(())
    }

    async fn require_object(&self, repo: &str, oid: &CommitId) -> BackendResult<StoredObject> {
        self.load_object(repo, oid)
            .await?
            .ok_or_else(|| BackendError::MissingObject {
                oid: oid.to_string(),
            })
    }
}

fn unknown_revision(repo: &str, rev: &str) -> impl FnOnce(RefError) -> BackendError {
    let repo = repo.to_string();
    let rev = rev.to_string();
    move |err| match err {
        RefError::NotFound { .. } => BackendError::UnknownRevision { path: repo, rev },
        other => other.into(),
    }
}

#[async_trait]
impl RepositoryBackend for MemoryBackend {
    async fn clone_repo(&self, url: &str, repo: &str, options: &CloneOptions) -> BackendResult<()> {
        info!(url, repo, single_branch = options.single_branch, depth = ?options.depth, proxy = ?options.proxy, "cloning");
        if self.files.exists(repo).await? && !self.files.read_dir(repo).await?.is_empty() {
            return Err(BackendError::DestinationExists(repo.to_string()));
        }
        let remote_name = options.remote_name.as_deref().unwrap_or(DEFAULT_REMOTE);
        self.files.mkdir_all(&layout::git_dir(repo)).await?;
        self.write_config(
            repo,
            &RepoConfig {
                remotes: vec![Remote {
                    name: remote_name.into(),
                    url: url.into(),
                }],
            },
        )
        .await?;

        let remote = self.contact(url).await?;
        self.mirror(
            repo,
            remote_name,
            &remote,
            options.single_branch,
            true,
            options.depth,
        )
        .await?;

        let refs = self.refs(repo);
        let default = remote.default_branch();
        if let Some(tip) = remote.tip(default) {
            refs.write_ref(&branch_ref(default), &RefValue::Direct(tip.clone()), true)
                .await?;
            let object = self.require_object(repo, tip).await?;
            self.write_tree(repo, &object).await?;
        }
        refs.set_head(default).await?;
        Ok(())
    }

    async fn fetch(&self, repo: &str, url: &str, options: &FetchOptions) -> BackendResult<()> {
        let config = self.read_config(repo).await?;
        let remote_name = config
            .remotes
            .iter()
            .find(|r| r.url == url)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| DEFAULT_REMOTE.to_string());
        debug!(repo, url, remote = %remote_name, proxy = ?options.proxy, "fetching");

        let remote = self.contact(url).await?;
        let fetched = self
            .mirror(
                repo,
                &remote_name,
                &remote,
                options.single_branch,
                options.tags,
                None,
            )
            .await?;

        if options.prune {
            let refs = self.refs(repo);
            for stale in refs.short_names(&format!("refs/remotes/{remote_name}/")).await? {
                if stale != DEFAULT_POINTER && !fetched.contains(&stale) {
                    refs.delete_ref(&remote_ref(&remote_name, &stale)).await?;
                    debug!(repo, branch = %stale, "pruned remote-tracking ref");
                }
            }
        }
        Ok(())
    }

    async fn list_branches(&self, repo: &str, remote: Option<&str>) -> BackendResult<Vec<String>> {
        self.read_config(repo).await?;
        let prefix = match remote {
            Some(remote) => format!("refs/remotes/{remote}/"),
            None => "refs/heads/".to_string(),
        };
        Ok(self.refs(repo).short_names(&prefix).await?)
    }

    async fn list_remotes(&self, repo: &str) -> BackendResult<Vec<Remote>> {
        Ok(self.read_config(repo).await?.remotes)
    }

    async fn log(&self, repo: &str, rev: &str, options: &LogOptions) -> BackendResult<Vec<Commit>> {
        let tip = self.resolve_ref(repo, rev).await?;
        let excluded = match &options.since {
            Some(since) => {
                let base = self.resolve_ref(repo, since).await?;
                self.ancestry(repo, &base).await?
            }
            None => HashSet::new(),
        };

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([tip]);
        let mut commits = Vec::new();
        while let Some(oid) = queue.pop_front() {
            if excluded.contains(&oid) || !seen.insert(oid.clone()) {
                continue;
            }
            // A missing parent marks a shallow boundary.
            let Some(object) = self.load_object(repo, &oid).await? else {
                continue;
            };
            let record = object.to_record();
            queue.extend(record.commit.parents.iter().cloned());
            commits.push(record.commit);
        }

        commits.sort_by(|a, b| b.author.timestamp.cmp(&a.author.timestamp));
        if let Some(depth) = options.depth {
            commits.truncate(depth);
        }
        Ok(commits)
    }

    async fn read_commit(&self, repo: &str, oid: &CommitId) -> BackendResult<CommitRecord> {
        let record = self.require_object(repo, oid).await?.to_record();
        if record.commit.oid != *oid {
            return Err(BackendError::Corrupt {
                path: layout::object_file(repo, oid),
                reason: format!("content hashes to {}", record.commit.oid),
            });
        }
        Ok(record)
    }

    async fn checkout(&self, repo: &str, rev: &str) -> BackendResult<()> {
        let config = self.read_config(repo).await?;
        let refs = self.refs(repo);

        let oid = if refs.read_ref(&branch_ref(rev)).await?.is_some() {
            refs.set_head(rev).await?;
            refs.resolve(&branch_ref(rev)).await?
        } else {
            let mut tracking = None;
            if rev != DEFAULT_POINTER {
                for remote in &config.remotes {
                    let name = remote_ref(&remote.name, rev);
                    if refs.read_ref(&name).await?.is_some() {
                        tracking = Some(refs.resolve(&name).await?);
                        break;
                    }
                }
            }
            match tracking {
                Some(oid) => {
                    refs.write_ref(&branch_ref(rev), &RefValue::Direct(oid.clone()), false)
                        .await?;
                    refs.set_head(rev).await?;
                    oid
                }
                None => {
                    let oid = self.resolve_ref(repo, rev).await?;
                    refs.set_head_detached(&oid).await?;
                    oid
                }
            }
        };

        let object = self.require_object(repo, &oid).await?;
        self.write_tree(repo, &object).await?;
        debug!(repo, rev, commit = %oid, "checked out");
        Ok(())
    }

    async fn resolve_ref(&self, repo: &str, rev: &str) -> BackendResult<CommitId> {
        self.read_config(repo).await?;
        let oid = self
            .refs(repo)
            .resolve_revision(rev)
            .await
            .map_err(unknown_revision(repo, rev))?;
        if self.load_object(repo, &oid).await?.is_none() {
            return Err(BackendError::UnknownRevision {
                path: repo.to_string(),
                rev: rev.to_string(),
            });
        }
        Ok(oid)
    }

    async fn write_ref(
        &self,
        repo: &str,
        name: &str,
        value: &CommitId,
        force: bool,
    ) -> BackendResult<()> {
        self.read_config(repo).await?;
        self.refs(repo)
            .write_ref(name, &RefValue::Direct(value.clone()), force)
            .await?;
        Ok(())
    }

    async fn current_branch(&self, repo: &str) -> BackendResult<Option<String>> {
        self.read_config(repo).await?;
        Ok(self
            .refs(repo)
            .head()
            .await?
            .and_then(|head| head.branch().map(str::to_string)))
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("latency", &self.latency)
            .field("network_calls", &self.network_calls())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::CommitDraft;
    use srs_store::InMemoryFileStore;

    const URL: &str = "https://example.com/site.git";

    fn hosted() -> (MemoryBackend, RemoteRepository) {
        let mut repo = RemoteRepository::new("main");
        repo.commit("main", CommitDraft::new("init").file("index.html", "v1"));
        repo.commit("main", CommitDraft::new("css").file("css/main.css", "body{}"));
        repo.branch_from("feature", "main");
        repo.commit("feature", CommitDraft::new("feature page").file("f.html", "f"));
        let root = repo.reachable(repo.tip("main"), None).last().cloned().unwrap().0;
        repo.tag("v1", &root);

        let backend = MemoryBackend::new(Arc::new(InMemoryFileStore::new()));
        backend.host(URL, repo.clone()).unwrap();
        (backend, repo)
    }

    #[tokio::test]
    async fn clone_materializes_refs_tree_and_config() {
        let (backend, remote) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();

        let files = backend.files();
        assert_eq!(
            files.read_dir("/site").await.unwrap(),
            vec![".git", "css", "index.html"]
        );
        assert_eq!(
            backend.list_branches("/site", Some("origin")).await.unwrap(),
            vec!["HEAD", "feature", "main"]
        );
        assert_eq!(backend.list_branches("/site", None).await.unwrap(), vec!["main"]);
        assert_eq!(
            backend.list_remotes("/site").await.unwrap(),
            vec![Remote {
                name: "origin".into(),
                url: URL.into()
            }]
        );
        assert_eq!(
            backend.current_branch("/site").await.unwrap().as_deref(),
            Some("main")
        );
        assert_eq!(
            &backend.resolve_ref("/site", "origin/HEAD").await.unwrap(),
            remote.tip("main").unwrap()
        );
        assert!(backend.resolve_ref("/site", "v1").await.is_ok());
        assert_eq!(backend.network_calls(), 1);
    }

    #[tokio::test]
    async fn clone_single_branch_and_depth() {
        let (backend, _) = hosted();
        backend
            .clone_repo(
                URL,
                "/site",
                &CloneOptions {
                    single_branch: true,
                    depth: Some(1),
                    ..CloneOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            backend.list_branches("/site", Some("origin")).await.unwrap(),
            vec!["HEAD", "main"]
        );
        let log = backend
            .log("/site", "main", &LogOptions::default())
            .await
            .unwrap();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn clone_of_unknown_remote_leaves_partial_directory() {
        let backend = MemoryBackend::new(Arc::new(InMemoryFileStore::new()));
        let err = backend
            .clone_repo("https://nowhere/x.git", "/x", &CloneOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::UnknownRemote { .. }));
        assert!(backend.files().exists("/x/.git/config.json").await.unwrap());
    }

    #[tokio::test]
    async fn clone_refuses_non_empty_destination() {
        let (backend, _) = hosted();
        backend.files().mkdir("/site").await.unwrap();
        backend.files().write_file("/site/junk", b"").await.unwrap();
        assert!(matches!(
            backend.clone_repo(URL, "/site", &CloneOptions::default()).await,
            Err(BackendError::DestinationExists(_))
        ));
    }

    #[tokio::test]
    async fn checkout_remote_only_branch_creates_local_branch() {
        let (backend, remote) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();
        backend.checkout("/site", "feature").await.unwrap();

        assert_eq!(
            backend.list_branches("/site", None).await.unwrap(),
            vec!["feature", "main"]
        );
        assert_eq!(
            backend.current_branch("/site").await.unwrap().as_deref(),
            Some("feature")
        );
        assert_eq!(
            &backend.resolve_ref("/site", "feature").await.unwrap(),
            remote.tip("feature").unwrap()
        );
        assert!(backend.files().exists("/site/f.html").await.unwrap());
    }

    #[tokio::test]
    async fn checkout_commit_detaches_and_rewrites_tree() {
        let (backend, remote) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();
        let log = backend
            .log("/site", "main", &LogOptions::default())
            .await
            .unwrap();
        let root = log.last().unwrap().oid.clone();

        backend.checkout("/site", root.as_str()).await.unwrap();
        assert_eq!(backend.current_branch("/site").await.unwrap(), None);
        assert!(!backend.files().exists("/site/css").await.unwrap());
        assert!(backend.files().exists("/site/index.html").await.unwrap());
        assert_eq!(
            &backend.resolve_ref("/site", "main").await.unwrap(),
            remote.tip("main").unwrap()
        );
    }

    #[tokio::test]
    async fn log_since_excludes_known_history() {
        let (backend, _) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();
        let new = backend
            .log(
                "/site",
                "refs/remotes/origin/feature",
                &LogOptions {
                    depth: None,
                    since: Some("refs/heads/main".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].message, "feature page");

        let all = backend
            .log("/site", "origin/feature", &LogOptions::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all
            .windows(2)
            .all(|w| w[0].author.timestamp >= w[1].author.timestamp));
    }

    #[tokio::test]
    async fn fetch_updates_tracking_refs_and_prunes() {
        let (backend, _) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();
        let new_tip = backend
            .update_remote(URL, |repo| {
                repo.remove_branch("feature");
                repo.commit("main", CommitDraft::new("more"))
            })
            .unwrap();

        backend
            .fetch(
                "/site",
                URL,
                &FetchOptions {
                    prune: true,
                    ..FetchOptions::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            backend.resolve_ref("/site", "origin/main").await.unwrap(),
            new_tip
        );
        assert_ne!(backend.resolve_ref("/site", "main").await.unwrap(), new_tip);
        assert_eq!(
            backend.list_branches("/site", Some("origin")).await.unwrap(),
            vec!["HEAD", "main"]
        );
        let record = backend.read_commit("/site", &new_tip).await.unwrap();
        assert_eq!(record.commit.message, "more");
        assert_eq!(backend.network_calls(), 2);
    }

    #[tokio::test]
    async fn clone_records_named_remote_and_fetch_follows_it() {
        let (backend, _) = hosted();
        backend
            .clone_repo(
                URL,
                "/site",
                &CloneOptions {
                    remote_name: Some("upstream".into()),
                    ..CloneOptions::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            backend.list_remotes("/site").await.unwrap(),
            vec![Remote {
                name: "upstream".into(),
                url: URL.into()
            }]
        );

        let new_tip = backend
            .update_remote(URL, |repo| repo.commit("main", CommitDraft::new("more")))
            .unwrap();
        backend
            .fetch("/site", URL, &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(
            backend.resolve_ref("/site", "upstream/main").await.unwrap(),
            new_tip
        );
    }

    #[tokio::test(start_paused = true)]
    async fn latency_can_change_between_calls() {
        let (backend, _) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();
        backend.set_latency(Some(Duration::from_secs(30))).unwrap();

        let started = tokio::time::Instant::now();
        backend
            .fetch("/site", URL, &FetchOptions::default())
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn offline_remote_fails_fetch() {
        let (backend, _) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();
        backend.set_offline(URL, true).unwrap();
        assert!(matches!(
            backend.fetch("/site", URL, &FetchOptions::default()).await,
            Err(BackendError::Network { .. })
        ));
    }

    #[tokio::test]
    async fn operations_on_missing_repository() {
        let backend = MemoryBackend::new(Arc::new(InMemoryFileStore::new()));
        assert!(matches!(
            backend.list_remotes("/nope").await,
            Err(BackendError::NotARepository(_))
        ));
        assert!(matches!(
            backend.resolve_ref("/nope", "main").await,
            Err(BackendError::NotARepository(_))
        ));
    }

    #[tokio::test]
    async fn unknown_revisions_and_ref_writes() {
        let (backend, remote) = hosted();
        backend
            .clone_repo(URL, "/site", &CloneOptions::default())
            .await
            .unwrap();
        assert!(matches!(
            backend.resolve_ref("/site", "nope").await,
            Err(BackendError::UnknownRevision { .. })
        ));
        assert!(matches!(
            backend
                .resolve_ref("/site", CommitId::from_digest([9; 32]).as_str())
                .await,
            Err(BackendError::UnknownRevision { .. })
        ));

        let feature = remote.tip("feature").unwrap();
        backend
            .write_ref("/site", "refs/heads/main", feature, true)
            .await
            .unwrap();
        assert_eq!(&backend.resolve_ref("/site", "main").await.unwrap(), feature);
    }
}
