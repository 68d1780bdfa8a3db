//! Reference management for signed repository sync.
//!
//! References are the named entry points into a repository's commit graph.
//! They live as small text files beneath a repository's metadata directory
//! and are read and written through a [`FileStore`](srs_store::FileStore).
//!
//! # Architecture
//!
//! - **Branches** (`refs/heads/*`) are local pointers. The sync engine moves
//!   them only after every newly reachable commit has been verified.
//! - **Remote-tracking refs** (`refs/remotes/{remote}/*`) mirror the remote
//!   and are only written by clone and fetch.
//! - **Tags** (`refs/tags/*`) are fetched alongside branches.
//! - **HEAD** either names the current branch or is detached at a commit.
//!
//! # Modules
//!
//! - [`error`] - Error types for ref operations
//! - [`types`] - [`RefValue`] and [`Head`]
//! - [`traits`] - The [`RefStore`] trait
//! - [`names`] - Name validation and canonical ref name helpers
//! - [`file`] - [`FileRefStore`], refs stored as files in a `FileStore`

pub mod error;
pub mod file;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use file::FileRefStore;
pub use names::{
    branch_ref, remote_ref, tag_ref, validate_branch_name, validate_ref_name,
    validate_remote_name, DEFAULT_POINTER,
};
pub use traits::RefStore;
pub use types::{Head, RefValue};
