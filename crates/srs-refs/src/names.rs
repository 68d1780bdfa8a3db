//! Ref name validation and canonical name helpers.
//!
//! Valid branch names:
//! - Must be non-empty
//! - Must not contain whitespace, `~`, `^`, `:`, `?`, `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not start or end with `.` or `/`
//! - Must not end with `.lock`
//! - Components between slashes must be non-empty and not start with `.`

use crate::error::{RefError, Result};

/// Name of the default-pointer pseudo-branch. Remotes advertise it next to
/// real branches; it is never treated as a branch of its own.
pub const DEFAULT_POINTER: &str = "HEAD";

const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

fn invalid_branch(name: &str, reason: impl Into<String>) -> RefError {
    RefError::InvalidBranchName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

/// Validate a branch name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use srs_refs::names::validate_branch_name;
///
/// assert!(validate_branch_name("main").is_ok());
/// assert!(validate_branch_name("feature/auth").is_ok());
/// assert!(validate_branch_name("").is_err());
/// assert!(validate_branch_name("bad..name").is_err());
/// ```
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid_branch(name, "branch name must not be empty"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid_branch(
            name,
            format!("contains forbidden character: {ch:?}"),
        ));
    }
    if name.contains("..") {
        return Err(invalid_branch(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(invalid_branch(name, "must not contain '@{'"));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(invalid_branch(name, "must not start or end with '.'"));
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Err(invalid_branch(name, "must not start or end with '/'"));
    }
    if name.ends_with(".lock") {
        return Err(invalid_branch(name, "must not end with '.lock'"));
    }
    for component in name.split('/') {
        if component.is_empty() {
            return Err(invalid_branch(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(invalid_branch(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }
    Ok(())
}

/// Validate a remote name. Must be a simple identifier (no slashes).
pub fn validate_remote_name(name: &str) -> Result<()> {
    if name.contains('/') {
        return Err(invalid_branch(name, "remote name must not contain '/'"));
    }
    validate_branch_name(name)
}

/// Validate a full ref name: `HEAD`, or `refs/` followed by a valid
/// branch-style path.
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name == DEFAULT_POINTER {
        return Ok(());
    }
    let rest = name
        .strip_prefix("refs/")
        .ok_or_else(|| RefError::InvalidRefName {
            name: name.to_string(),
            reason: "must be HEAD or start with 'refs/'".into(),
        })?;
    validate_branch_name(rest).map_err(|e| RefError::InvalidRefName {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// `refs/heads/{branch}`
pub fn branch_ref(branch: &str) -> String {
    format!("refs/heads/{branch}")
}

/// `refs/remotes/{remote}/{branch}`
pub fn remote_ref(remote: &str, branch: &str) -> String {
    format!("refs/remotes/{remote}/{branch}")
}

/// `refs/tags/{tag}`
pub fn tag_ref(tag: &str) -> String {
    format!("refs/tags/{tag}")
}
