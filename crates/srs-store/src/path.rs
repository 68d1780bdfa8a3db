//! Helpers for the absolute, `/`-separated path space of a [`FileStore`].
//!
//! [`FileStore`]: crate::FileStore

use crate::error::{StoreError, StoreResult};

/// The storage root.
pub const ROOT: &str = "/";

/// Normalize an absolute path: collapse repeated separators, drop `.`
/// components and trailing slashes. `..` is rejected.
pub fn normalize(path: &str) -> StoreResult<String> {
    if !path.starts_with('/') {
        return Err(StoreError::InvalidPath {
            path: path.to_string(),
            reason: "path must be absolute".into(),
        });
    }

    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(StoreError::InvalidPath {
                    path: path.to_string(),
                    reason: "parent components are not allowed".into(),
                })
            }
            other => parts.push(other),
        }
    }

    Ok(format!("/{}", parts.join("/")))
}

/// Returns `true` if `path` denotes the storage root (`/`, `//`, `/.`, ...).
pub fn is_root(path: &str) -> bool {
    matches!(normalize(path).as_deref(), Ok(ROOT))
}

/// Returns `true` if normalized `dir` is `path` or one of its ancestors.
pub fn encloses(dir: &str, path: &str) -> bool {
    dir == ROOT
        || path == dir
        || path
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Join a child name onto a directory path.
pub fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    format!("{dir}/{name}")
}

/// Parent directory of a normalized path; `None` for the root.
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rsplit_once('/') {
        Some(("", _)) => Some(ROOT),
        Some((head, _)) => Some(head),
        None => None,
    }
}

/// Final component of a normalized path; `None` for the root.
pub fn file_name(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
