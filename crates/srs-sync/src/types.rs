use serde::{Deserialize, Serialize};
use srs_types::CommitId;

/// Result of a successful clone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloneReport {
    pub url: String,
    pub local_path: String,
    /// Remote branches that were validated, in listing order.
    pub branches: Vec<String>,
    /// The most recent validated commit, now checked out detached.
    pub head: CommitId,
    /// Fingerprint of the key that was pinned.
    pub key_id: String,
}

/// Outcome of fetch for a single branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchStatus {
    UpToDate,
    /// The local pointer was moved to the remote-tracking commit.
    Updated { from: CommitId, to: CommitId },
    /// The local pointer was left alone.
    Rejected {
        /// The first commit that failed, when a commit was at fault.
        commit: Option<CommitId>,
        reason: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchReport {
    pub branch: String,
    /// Commits reachable from the remote but not from the local pointer.
    pub new_commits: usize,
    pub status: BranchStatus,
}

/// Result of fetch across all local branches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReport {
    /// One entry per local branch, in listing order.
    pub branches: Vec<BranchReport>,
    pub any_branch_updated: bool,
    pub any_new_commits: bool,
}

impl FetchReport {
    pub fn from_branches(branches: Vec<BranchReport>) -> Self {
        let any_branch_updated = branches
            .iter()
            .any(|b| matches!(b.status, BranchStatus::Updated { .. }));
        let any_new_commits = branches.iter().any(|b| b.new_commits > 0);
        Self {
            branches,
            any_branch_updated,
            any_new_commits,
        }
    }

    /// At least one branch advanced.
    pub fn success(&self) -> bool {
        self.any_branch_updated
    }

    /// Nothing new on the remote and nothing moved.
    pub fn up_to_date(&self) -> bool {
        !self.any_new_commits && !self.any_branch_updated
    }

    pub fn branch(&self, name: &str) -> Option<&BranchStatus> {
        self.branches
            .iter()
            .find(|b| b.branch == name)
            .map(|b| &b.status)
    }

    /// One human-readable line per branch.
    pub fn summary(&self) -> String {
        self.branches
            .iter()
            .map(|b| match &b.status {
                BranchStatus::UpToDate => format!("{}: up to date", b.branch),
                BranchStatus::Updated { from, to } => {
                    format!("{}: updated {}..{}", b.branch, from.short(), to.short())
                }
                BranchStatus::Rejected {
                    commit: Some(commit),
                    reason,
                } => format!("{}: rejected at {}: {reason}", b.branch, commit.short()),
                BranchStatus::Rejected {
                    commit: None,
                    reason,
                } => format!("{}: rejected: {reason}", b.branch),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Result of checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReport {
    pub branch: String,
    pub commit: CommitId,
    pub detached: bool,
}

/// Outcome of a recursive delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Removal {
    /// The target and `entries` entries beneath it were removed.
    Removed { entries: usize },
    /// The target was the storage root; nothing was touched.
    RefusedRoot,
    /// Nothing existed at the target.
    Absent,
}
