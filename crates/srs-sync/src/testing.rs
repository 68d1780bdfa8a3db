//! Shared fixtures for engine tests.

use std::sync::Arc;
use std::time::Duration;

use srs_backend::{CommitDraft, MemoryBackend, RemoteRepository};
use srs_crypto::{Ed25519Verifier, SigningKey};
use srs_store::InMemoryFileStore;
use srs_trust::InMemoryTrustStore;
use srs_types::CommitId;

use crate::config::{SyncConfig, TrustAnchor};
use crate::engine::SyncEngine;

pub const URL: &str = "https://git.example.org/acme/site.git";
pub const PATH: &str = "/site";

pub struct Fixture {
    pub files: Arc<InMemoryFileStore>,
    pub backend: Arc<MemoryBackend>,
    pub trust: Arc<InMemoryTrustStore>,
    pub engine: SyncEngine,
    pub key: SigningKey,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(None, SyncConfig::default())
    }

    pub fn build(latency: Option<Duration>, config: SyncConfig) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let files = Arc::new(InMemoryFileStore::new());
        let mut backend = MemoryBackend::new(files.clone());
        if let Some(latency) = latency {
            backend = backend.with_latency(latency);
        }
        let backend = Arc::new(backend);
        let trust = Arc::new(InMemoryTrustStore::new());
        let engine = SyncEngine::new(
            backend.clone(),
            files.clone(),
            Arc::new(Ed25519Verifier),
            trust.clone(),
            config,
        )
        .unwrap();
        Self {
            files,
            backend,
            trust,
            engine,
            key: SigningKey::generate(),
        }
    }

    pub fn anchor(&self) -> TrustAnchor {
        anchor_for(&self.key)
    }

    pub fn host(&self, repo: RemoteRepository) {
        self.backend.host(URL, repo).unwrap();
    }

    pub fn update(&self, f: impl FnOnce(&mut RemoteRepository)) {
        self.backend.update_remote(URL, f).unwrap();
    }

    pub async fn local_tip(&self, branch: &str) -> CommitId {
        use srs_backend::RepositoryBackend;
        self.backend
            .resolve_ref(PATH, &srs_refs::branch_ref(branch))
            .await
            .unwrap()
    }
}

pub fn anchor_for(key: &SigningKey) -> TrustAnchor {
    TrustAnchor::new(key.public_key().to_armored())
}

/// `main` with three signed commits and `feature` forked from the first one
/// with two signed commits of its own.
pub fn signed_repo(key: &SigningKey) -> RemoteRepository {
    let mut repo = RemoteRepository::new("main");
    repo.commit(
        "main",
        CommitDraft::new("initial page")
            .file("index.html", "<h1>v1</h1>")
            .signed_by(key),
    );
    repo.branch_from("feature", "main");
    repo.commit(
        "main",
        CommitDraft::new("add about page")
            .file("about.html", "about")
            .signed_by(key),
    );
    repo.commit(
        "main",
        CommitDraft::new("restyle")
            .file("style.css", "h1 {}")
            .signed_by(key),
    );
    repo.commit(
        "feature",
        CommitDraft::new("feature draft")
            .file("feature.html", "draft")
            .signed_by(key),
    );
    repo.commit(
        "feature",
        CommitDraft::new("feature final")
            .file("feature.html", "final")
            .signed_by(key),
    );
    repo
}
