use async_trait::async_trait;

use crate::digest::TrustDigest;
use crate::error::TrustResult;

/// Persistent mapping from [`TrustDigest`] to an armored public key.
#[async_trait]
pub trait TrustStore: Send + Sync {
    /// The pinned key for `digest`, if any.
    async fn get(&self, digest: &TrustDigest) -> TrustResult<Option<String>>;

    /// Pin `armored_key` under `digest`, replacing any existing entry.
    async fn set(&self, digest: &TrustDigest, armored_key: &str) -> TrustResult<()>;

    /// Remove the entry for `digest`. Returns `false` if there was none.
    async fn remove(&self, digest: &TrustDigest) -> TrustResult<bool>;
}
