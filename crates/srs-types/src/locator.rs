//! Local identity of a repository, derived from its source URL.

use crate::error::TypeError;

const VCS_SUFFIX: &str = ".git";

/// Derive the local repository name from a source URL.
///
/// The name is the last path segment of the URL with trailing slashes ignored
/// and a trailing `.git` stripped.
///
/// ```
/// use srs_types::repo_name;
///
/// assert_eq!(repo_name("https://host.example/org/site.git").unwrap(), "site");
/// assert_eq!(repo_name("https://host.example/org/site/").unwrap(), "site");
/// assert!(repo_name("https://host.example/").is_err());
/// ```
pub fn repo_name(url: &str) -> Result<String, TypeError> {
    let invalid = |reason: &str| TypeError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("url is empty"));
    }

    if let Some((_, rest)) = trimmed.split_once("://") {
        if !rest.contains('/') {
            return Err(invalid("url has no path"));
        }
    }

    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    let name = segment.strip_suffix(VCS_SUFFIX).unwrap_or(segment);

    match name {
        "" => Err(invalid("url has no repository name")),
        "." | ".." => Err(invalid("repository name is a relative path component")),
        _ => Ok(name.to_string()),
    }
}

/// Local storage path for the repository at `url` beneath `root`.
pub fn local_path(root: &str, url: &str) -> Result<String, TypeError> {
    let name = repo_name(url)?;
    let root = root.trim_end_matches('/');
    Ok(format!("{root}/{name}"))
}
