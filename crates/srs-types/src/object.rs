use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a commit.
///
/// A `CommitId` is content-derived by whichever backend authored the commit;
/// the sync engine treats it as opaque. Two formats are accepted: 40 hex
/// characters (SHA-1 object stores) and 64 hex characters (BLAKE3 or SHA-256
/// object stores). The value is always stored lowercase.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Accepted lengths, in hex characters.
    pub const LENGTHS: [usize; 2] = [40, 64];

    /// Parse and normalize a commit id.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidCommitId {
            value: value.to_string(),
            reason: reason.to_string(),
        };
        if !Self::LENGTHS.contains(&value.len()) {
            return Err(invalid("expected 40 or 64 hex characters"));
        }
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("contains non-hex characters"));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Build a commit id from a raw 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Returns `true` if `value` would parse as a commit id.
    pub fn looks_like(value: &str) -> bool {
        Self::parse(value).is_ok()
    }

    /// Full hex representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form (first 7 characters), as shown in commit pickers.
    pub fn short(&self) -> &str {
        &self.0[..7]
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", self.short())
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CommitId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
