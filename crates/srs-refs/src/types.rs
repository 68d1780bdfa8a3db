//! Reference values and HEAD state.

use std::fmt;

use srs_types::CommitId;

use crate::error::{RefError, Result};

const SYMBOLIC_PREFIX: &str = "ref: ";

/// What a ref points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefValue {
    /// Points directly at a commit.
    Direct(CommitId),
    /// Points at another ref by its full name (e.g. `refs/heads/main`).
    Symbolic(String),
}

impl RefValue {
    /// Parse the stored text form: either a commit id or `ref: <target>`.
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        let trimmed = content.trim();
        if let Some(target) = trimmed.strip_prefix(SYMBOLIC_PREFIX) {
            let target = target.trim();
            if !target.is_empty() {
                return Ok(Self::Symbolic(target.to_string()));
            }
        } else if let Ok(oid) = CommitId::parse(trimmed) {
            return Ok(Self::Direct(oid));
        }
        Err(RefError::Malformed {
            name: name.to_string(),
            content: content.to_string(),
        })
    }

    /// The stored text form, newline-terminated.
    pub fn to_stored(&self) -> String {
        format!("{self}\n")
    }

    /// The commit id, if this is a direct ref.
    pub fn as_commit(&self) -> Option<&CommitId> {
        match self {
            Self::Direct(oid) => Some(oid),
            Self::Symbolic(_) => None,
        }
    }
}

impl fmt::Display for RefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct(oid) => write!(f, "{oid}"),
            Self::Symbolic(target) => write!(f, "{SYMBOLIC_PREFIX}{target}"),
        }
    }
}

/// The state of HEAD: attached to a branch, or detached at a commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// HEAD names a local branch (short name, e.g. `main`).
    Attached(String),
    /// HEAD points directly at a commit.
    Detached(CommitId),
}

impl Head {
    /// The branch name when attached.
    pub fn branch(&self) -> Option<&str> {
        match self {
            Self::Attached(branch) => Some(branch),
            Self::Detached(_) => None,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, Self::Detached(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid() -> CommitId {
        CommitId::parse(&"ab".repeat(20)).unwrap()
    }

    #[test]
    fn parse_direct_and_symbolic() {
        let direct = RefValue::parse("refs/heads/main", &format!("{}\n", oid())).unwrap();
        assert_eq!(direct, RefValue::Direct(oid()));
        assert_eq!(direct.as_commit(), Some(&oid()));

        let symbolic = RefValue::parse("HEAD", "ref: refs/heads/main\n").unwrap();
        assert_eq!(symbolic, RefValue::Symbolic("refs/heads/main".into()));
        assert_eq!(symbolic.to_stored(), "ref: refs/heads/main\n");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            RefValue::parse("HEAD", "not a ref"),
            Err(RefError::Malformed { .. })
        ));
        assert!(RefValue::parse("HEAD", "ref: ").is_err());
        assert!(RefValue::parse("HEAD", "").is_err());
    }

    #[test]
    fn head_accessors() {
        assert_eq!(Head::Attached("main".into()).branch(), Some("main"));
        assert!(Head::Detached(oid()).is_detached());
        assert_eq!(Head::Detached(oid()).branch(), None);
    }
}
