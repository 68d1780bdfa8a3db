//! Signed repository synchronization.
//!
//! [`SyncEngine`] replicates version-controlled content to an untrusted
//! client while guaranteeing that only signed history ever becomes visible.
//! Unlike a plain clone/fetch, every commit is verified against a public key
//! pinned on first trust before any branch pointer is allowed to reach it.
//!
//! # Policies
//!
//! - **Clone** is all-or-nothing. Every commit on every branch must verify
//!   against the trust anchor; otherwise the local copy is removed and no key
//!   is pinned.
//! - **Fetch** is per branch. Only commits not already reachable locally are
//!   verified; a branch with a bad commit keeps its old pointer while the
//!   other branches advance.
//! - **Delete** is a post-order recursive removal that never touches the
//!   storage root.

pub mod anchor;
pub mod config;
pub mod delete;
pub mod engine;
pub mod error;
pub mod inventory;
#[cfg(test)]
mod testing;
pub mod trust;
pub mod types;
pub mod validate;

pub use anchor::{AnchorResolver, DefaultAnchorResolver};
pub use config::{AnchorKind, SyncConfig, TrustAnchor};
pub use delete::remove_tree;
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use inventory::{CommitSummary, RepositoryInfo};
pub use trust::TrustPins;
pub use types::{BranchReport, BranchStatus, CheckoutReport, CloneReport, FetchReport, Removal};
pub use validate::CommitValidator;
