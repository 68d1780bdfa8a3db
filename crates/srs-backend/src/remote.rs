//! Hosted repositories served by [`MemoryBackend`](crate::MemoryBackend).
//!
//! A [`RemoteRepository`] is the authoring side: it creates commits, signs
//! them (or not), and moves branches. Clones and fetches copy its objects
//! and refs into a local file store.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use srs_crypto::{ContentHasher, SigningKey};
use srs_types::{Author, Commit, CommitId, CommitRecord};

const EPOCH: i64 = 1_700_000_000;

/// The signed part of a commit: everything except the signature.
///
/// Serialized with `serde_json`; struct field order and the sorted file map
/// make the encoding canonical.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitBody {
    pub parents: Vec<CommitId>,
    pub author: Author,
    pub message: String,
    /// Working tree: relative path to file contents.
    pub files: BTreeMap<String, String>,
}

impl CommitBody {
    /// Canonical bytes covered by the signature.
    pub fn payload(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn oid(&self) -> CommitId {
        CommitId::from_digest(ContentHasher::COMMIT.hash(&self.payload()))
    }
}

/// A commit as stored in an object directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub body: CommitBody,
    pub signature: Option<String>,
}

impl StoredObject {
    pub fn oid(&self) -> CommitId {
        self.body.oid()
    }

    pub fn to_record(&self) -> CommitRecord {
        let payload = self.body.payload();
        let commit = Commit {
            oid: CommitId::from_digest(ContentHasher::COMMIT.hash(&payload)),
            parents: self.body.parents.clone(),
            author: self.body.author.clone(),
            message: self.body.message.clone(),
            signature: self.signature.clone(),
        };
        CommitRecord { commit, payload }
    }
}

enum Signing<'a> {
    Unsigned,
    Key(&'a SigningKey),
    Raw(String),
}

/// A commit to be authored on a [`RemoteRepository`] branch.
///
/// Files start from the parent's tree; [`file`](Self::file) adds or replaces
/// entries.
pub struct CommitDraft<'a> {
    message: String,
    timestamp: Option<i64>,
    files: BTreeMap<String, String>,
    signing: Signing<'a>,
}

impl<'a> CommitDraft<'a> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: None,
            files: BTreeMap::new(),
            signing: Signing::Unsigned,
        }
    }

    /// Author timestamp in seconds. Defaults to a per-repository clock.
    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Sign the commit payload with `key`.
    pub fn signed_by(mut self, key: &'a SigningKey) -> Self {
        self.signing = Signing::Key(key);
        self
    }

    /// Attach an arbitrary signature blob, valid or not.
    pub fn with_signature(mut self, armored: impl Into<String>) -> Self {
        self.signing = Signing::Raw(armored.into());
        self
    }
}

/// A repository hosted at some URL.
#[derive(Clone, Debug)]
pub struct RemoteRepository {
    default_branch: String,
    branches: BTreeMap<String, CommitId>,
    tags: BTreeMap<String, CommitId>,
    objects: HashMap<CommitId, StoredObject>,
    clock: i64,
}

impl RemoteRepository {
    /// An empty repository whose `HEAD` will name `default_branch`.
    pub fn new(default_branch: impl Into<String>) -> Self {
        Self {
            default_branch: default_branch.into(),
            branches: BTreeMap::new(),
            tags: BTreeMap::new(),
            objects: HashMap::new(),
            clock: EPOCH,
        }
    }

    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Author a commit on top of `branch` (creating the branch if needed)
    /// and advance the branch to it.
    pub fn commit(&mut self, branch: &str, draft: CommitDraft<'_>) -> CommitId {
        let parent = self.branches.get(branch).cloned();
        let mut files = parent
            .as_ref()
            .and_then(|p| self.objects.get(p))
            .map(|o| o.body.files.clone())
            .unwrap_or_default();
        files.extend(draft.files);

        let timestamp = draft.timestamp.unwrap_or_else(|| {
            self.clock += 1;
            self.clock
        });
        let body = CommitBody {
            parents: parent.into_iter().collect(),
            author: Author {
                name: "Site Publisher".into(),
                email: "publisher@example.org".into(),
                timestamp,
            },
            message: draft.message,
            files,
        };
        let signature = match draft.signing {
            Signing::Unsigned => None,
            Signing::Key(key) => Some(key.sign_armored(&body.payload())),
            Signing::Raw(blob) => Some(blob),
        };

        let object = StoredObject { body, signature };
        let oid = object.oid();
        self.objects.insert(oid.clone(), object);
        self.branches.insert(branch.to_string(), oid.clone());
        oid
    }

    /// Create `branch` at the current tip of `from`. Returns `false` if
    /// `from` does not exist.
    pub fn branch_from(&mut self, branch: &str, from: &str) -> bool {
        match self.branches.get(from).cloned() {
            Some(tip) => {
                self.branches.insert(branch.to_string(), tip);
                true
            }
            None => false,
        }
    }

    /// Move `branch` to an existing commit (e.g. to rewind history).
    pub fn reset_branch(&mut self, branch: &str, oid: &CommitId) -> bool {
        if !self.objects.contains_key(oid) {
            return false;
        }
        self.branches.insert(branch.to_string(), oid.clone());
        true
    }

    pub fn remove_branch(&mut self, branch: &str) -> Option<CommitId> {
        self.branches.remove(branch)
    }

    pub fn tag(&mut self, name: &str, oid: &CommitId) -> bool {
        if !self.objects.contains_key(oid) {
            return false;
        }
        self.tags.insert(name.to_string(), oid.clone());
        true
    }

    pub fn tip(&self, branch: &str) -> Option<&CommitId> {
        self.branches.get(branch)
    }

    pub fn branches(&self) -> &BTreeMap<String, CommitId> {
        &self.branches
    }

    pub fn tags(&self) -> &BTreeMap<String, CommitId> {
        &self.tags
    }

    pub fn object(&self, oid: &CommitId) -> Option<&StoredObject> {
        self.objects.get(oid)
    }

    /// Objects reachable from `tips`, at most `depth` generations deep.
    pub fn reachable<'a>(
        &self,
        tips: impl IntoIterator<Item = &'a CommitId>,
        depth: Option<usize>,
    ) -> Vec<(CommitId, StoredObject)> {
        let mut seen = HashSet::new();
        let mut queue: VecDeque<(CommitId, usize)> =
            tips.into_iter().map(|oid| (oid.clone(), 1)).collect();
        let mut out = Vec::new();
        while let Some((oid, generation)) = queue.pop_front() {
            if depth.is_some_and(|d| generation > d) || !seen.insert(oid.clone()) {
                continue;
            }
            if let Some(object) = self.objects.get(&oid) {
                for parent in &object.body.parents {
                    queue.push_back((parent.clone(), generation + 1));
                }
                out.push((oid, object.clone()));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srs_crypto::{Ed25519Verifier, SignatureVerifier};

    #[test]
    fn commits_chain_and_inherit_files() {
        let mut repo = RemoteRepository::new("main");
        let first = repo.commit("main", CommitDraft::new("one").file("index.html", "v1"));
        let second = repo.commit("main", CommitDraft::new("two").file("about.html", "a"));

        let object = repo.object(&second).unwrap();
        assert_eq!(object.body.parents, vec![first]);
        assert_eq!(object.body.files.len(), 2);
        assert_eq!(repo.tip("main"), Some(&second));
        assert!(object.body.author.timestamp > EPOCH);
    }

    #[test]
    fn oid_is_content_derived() {
        let mut a = RemoteRepository::new("main");
        let mut b = RemoteRepository::new("main");
        let draft = || CommitDraft::new("same").at(5).file("f", "x");
        assert_eq!(a.commit("main", draft()), b.commit("main", draft()));
        let record = a.object(a.tip("main").unwrap()).unwrap().to_record();
        assert_eq!(&record.commit.oid, a.tip("main").unwrap());
    }

    #[tokio::test]
    async fn signed_commits_verify_over_their_payload() {
        let key = SigningKey::generate();
        let mut repo = RemoteRepository::new("main");
        let oid = repo.commit("main", CommitDraft::new("signed").signed_by(&key));
        let record = repo.object(&oid).unwrap().to_record();

        let verifier = Ed25519Verifier;
        let sig = verifier
            .read_signature(record.commit.detached_signature().unwrap())
            .await
            .unwrap();
        let outcome = verifier
            .verify(&record.payload, &sig, &key.public_key())
            .await
            .unwrap();
        assert!(outcome.valid);
    }

    #[test]
    fn reachable_respects_depth() {
        let mut repo = RemoteRepository::new("main");
        for i in 0..4 {
            repo.commit("main", CommitDraft::new(format!("c{i}")));
        }
        let tip = repo.tip("main").cloned().unwrap();
        assert_eq!(repo.reachable([&tip], None).len(), 4);
        assert_eq!(repo.reachable([&tip], Some(2)).len(), 2);
    }

    #[test]
    fn branch_management() {
        let mut repo = RemoteRepository::new("main");
        let root = repo.commit("main", CommitDraft::new("root"));
        assert!(repo.branch_from("feature", "main"));
        assert!(!repo.branch_from("x", "missing"));
        repo.commit("feature", CommitDraft::new("f1"));
        assert!(repo.reset_branch("feature", &root));
        assert_eq!(repo.tip("feature"), Some(&root));
        assert!(repo.tag("v1", &root));
        assert_eq!(repo.remove_branch("feature"), Some(root));
        assert_eq!(repo.branches().len(), 1);
    }
}
