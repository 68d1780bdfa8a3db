use std::sync::Arc;

use srs_trust::{TrustDigest, TrustStore};
use tracing::{debug, info};

use crate::error::SyncResult;

/// Key pins keyed by repository source URL.
///
/// Thin layer over a [`TrustStore`] that does the URL hashing.
#[derive(Clone)]
pub struct TrustPins {
    store: Arc<dyn TrustStore>,
}

impl TrustPins {
    pub fn new(store: Arc<dyn TrustStore>) -> Self {
        Self { store }
    }

    /// Pin `armored_key` for `url`, returning the key it replaced.
    pub async fn pin(&self, url: &str, armored_key: &str) -> SyncResult<Option<String>> {
        let digest = TrustDigest::from_url(url);
        let previous = self.store.get(&digest).await?;
        self.store.set(&digest, armored_key).await?;
        info!(url, digest = %digest, "pinned trust key");
        Ok(previous)
    }

    pub async fn lookup(&self, url: &str) -> SyncResult<Option<String>> {
        Ok(self.store.get(&TrustDigest::from_url(url)).await?)
    }

    /// Drop the pin for `url`. Returns `false` if there was none.
    pub async fn forget(&self, url: &str) -> SyncResult<bool> {
        let removed = self.store.remove(&TrustDigest::from_url(url)).await?;
        if removed {
            debug!(url, "removed trust pin");
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for TrustPins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustPins").finish_non_exhaustive()
    }
}
