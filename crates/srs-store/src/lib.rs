//! Hierarchical file storage for signed repository sync.
//!
//! Repositories are materialized into a tree of directories and files keyed
//! by absolute, `/`-separated path strings. The sync engine only ever lists,
//! inspects and removes entries; repository backends also create them.
//!
//! # Storage Backends
//!
//! All backends implement the [`FileStore`] trait:
//!
//! - [`InMemoryFileStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`DiskFileStore`] -- maps the path space onto a host directory
//!
//! # Design Rules
//!
//! 1. Paths are absolute; `..` is never accepted.
//! 2. The root `/` always exists and cannot be removed through the store.
//! 3. `rmdir` only removes empty directories; recursive removal is a policy
//!    of the caller, not of the store.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod disk;
pub mod error;
pub mod memory;
pub mod path;
pub mod traits;

pub use disk::DiskFileStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryFileStore;
pub use traits::{EntryKind, FileStat, FileStore};
