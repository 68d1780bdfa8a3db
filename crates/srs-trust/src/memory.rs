use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::digest::TrustDigest;
use crate::error::{TrustError, TrustResult};
use crate::traits::TrustStore;

/// In-memory trust store. Pins are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryTrustStore {
    keys: RwLock<HashMap<TrustDigest, String>>,
}

impl InMemoryTrustStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.read().map(|k| k.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TrustStore for InMemoryTrustStore {
    async fn get(&self, digest: &TrustDigest) -> TrustResult<Option<String>> {
        let keys = self.keys.read().map_err(|_| TrustError::LockPoisoned)?;
        Ok(keys.get(digest).cloned())
    }

    async fn set(&self, digest: &TrustDigest, armored_key: &str) -> TrustResult<()> {
        let mut keys = self.keys.write().map_err(|_| TrustError::LockPoisoned)?;
        keys.insert(*digest, armored_key.to_string());
        Ok(())
    }

    async fn remove(&self, digest: &TrustDigest) -> TrustResult<bool> {
        let mut keys = self.keys.write().map_err(|_| TrustError::LockPoisoned)?;
        Ok(keys.remove(digest).is_some())
    }
}
