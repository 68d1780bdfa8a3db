//! On-store layout of a local repository.

use serde::{Deserialize, Serialize};
use srs_store::path;
use srs_types::CommitId;

use crate::options::Remote;

/// Metadata directory name inside a repository.
pub const GIT_DIR: &str = ".git";

pub fn git_dir(repo: &str) -> String {
    path::join(repo, GIT_DIR)
}

pub fn config_file(repo: &str) -> String {
    path::join(&git_dir(repo), "config.json")
}

pub fn objects_dir(repo: &str) -> String {
    path::join(&git_dir(repo), "objects")
}

pub fn object_file(repo: &str, oid: &CommitId) -> String {
    path::join(&objects_dir(repo), oid.as_str())
}

/// Contents of `config.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub remotes: Vec<Remote>,
}

impl RepoConfig {
    pub fn remote(&self, name: &str) -> Option<&Remote> {
        self.remotes.iter().find(|r| r.name == name)
    }
}
