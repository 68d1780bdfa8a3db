//! Foundation types for signed repository sync.
//!
//! Every other `srs` crate depends on `srs-types`. The types here are
//! deliberately backend-agnostic: a commit is something that was authored
//! elsewhere and is only ever read and judged by the sync engine.
//!
//! # Key Types
//!
//! - [`CommitId`] - Opaque, fixed-format commit identifier (lowercase hex)
//! - [`Commit`] - Commit metadata including the optional detached signature
//! - [`CommitRecord`] - A commit together with the payload its signature covers
//! - [`repo_name`] / [`local_path`] - Local identity derived from a source URL

pub mod commit;
pub mod error;
pub mod locator;
pub mod object;

pub use commit::{Author, Commit, CommitRecord};
pub use error::TypeError;
pub use locator::{local_path, repo_name};
pub use object::CommitId;
