//! Repository backend for signed repository sync.
//!
//! The sync engine drives version control through the [`RepositoryBackend`]
//! trait: clone, fetch, branch and remote listing, history walks, commit
//! reads, checkout and ref reads/writes over a named directory of a
//! [`FileStore`](srs_store::FileStore).
//!
//! [`MemoryBackend`] implements the trait without a network. It hosts
//! [`RemoteRepository`] values by URL (authored with [`CommitDraft`]) and
//! materializes clones into any file store using this layout:
//!
//! ```text
//! <path>/.git/config.json        remotes
//! <path>/.git/objects/<oid>      one JSON document per commit
//! <path>/.git/refs/...           refs, see srs-refs
//! <path>/.git/HEAD
//! <path>/<working tree files>
//! ```

pub mod error;
pub mod layout;
pub mod memory;
pub mod options;
pub mod remote;
pub mod traits;

pub use error::{BackendError, BackendResult};
pub use memory::MemoryBackend;
pub use options::{CloneOptions, FetchOptions, LogOptions, Remote};
pub use remote::{CommitBody, CommitDraft, RemoteRepository, StoredObject};
pub use traits::RepositoryBackend;
