use serde::{Deserialize, Serialize};

/// Options for [`RepositoryBackend::clone_repo`](crate::RepositoryBackend::clone_repo).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// Only retrieve the remote's default branch.
    pub single_branch: bool,
    /// Limit history to this many generations per branch tip.
    pub depth: Option<usize>,
    /// HTTP(S) proxy to route traffic through.
    pub proxy: Option<String>,
    /// Name recorded for the remote; `origin` when unset.
    pub remote_name: Option<String>,
}

/// Options for [`RepositoryBackend::fetch`](crate::RepositoryBackend::fetch).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOptions {
    pub single_branch: bool,
    /// Also retrieve tags.
    pub tags: bool,
    /// Drop remote-tracking refs whose branch no longer exists upstream.
    pub prune: bool,
    pub proxy: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            single_branch: false,
            tags: true,
            prune: false,
            proxy: None,
        }
    }
}

/// Options for [`RepositoryBackend::log`](crate::RepositoryBackend::log).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Maximum number of commits returned.
    pub depth: Option<usize>,
    /// Exclude every commit reachable from this ref.
    pub since: Option<String>,
}

/// A configured remote of a local repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
}
