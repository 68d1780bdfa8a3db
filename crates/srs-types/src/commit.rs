//! Commit metadata as read from a repository backend.
//!
//! Commits are immutable once created by the backend. The sync engine never
//! constructs a commit of its own; it only reads commits and decides whether
//! their detached signature verifies.

use serde::{Deserialize, Serialize};

use crate::object::CommitId;

/// Commit author and the moment of authorship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
    /// Seconds since the Unix epoch. Used for recency ordering.
    pub timestamp: i64,
}

/// A commit as reported by a backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub oid: CommitId,
    pub parents: Vec<CommitId>,
    pub author: Author,
    pub message: String,
    /// ASCII-armored detached signature over the commit payload, if any.
    pub signature: Option<String>,
}

impl Commit {
    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// The detached signature, treating an empty or blank blob as absent.
    pub fn detached_signature(&self) -> Option<&str> {
        self.signature
            .as_deref()
            .filter(|sig| !sig.trim().is_empty())
    }

    /// Returns `true` if the commit carries a non-empty signature.
    pub fn is_signed(&self) -> bool {
        self.detached_signature().is_some()
    }
}

/// A commit together with the canonical bytes its signature was computed over.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRecord {
    pub commit: Commit,
    pub payload: Vec<u8>,
}

impl CommitRecord {
    pub fn oid(&self) -> &CommitId {
        &self.commit.oid
    }

    pub fn timestamp(&self) -> i64 {
        self.commit.author.timestamp
    }
}
