//! Trust-on-first-use key pinning for signed repository sync.
//!
//! The first successful clone of a repository pins the public key its
//! history was verified against. Every later fetch looks the key up again
//! by the digest of the repository's source URL; there is no other way for
//! a key to enter the store.
//!
//! - [`TrustDigest`] - fixed-length, domain-separated digest of a source URL
//! - [`TrustStore`] - async persistent mapping from digest to armored key
//! - [`InMemoryTrustStore`] - process-local store for tests
//! - [`JsonFileTrustStore`] - a single JSON document on the host filesystem

pub mod digest;
pub mod error;
pub mod json;
pub mod memory;
pub mod traits;

pub use digest::TrustDigest;
pub use error::{TrustError, TrustResult};
pub use json::JsonFileTrustStore;
pub use memory::InMemoryTrustStore;
pub use traits::TrustStore;
