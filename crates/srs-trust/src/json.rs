//! Trust store persisted as one JSON document on the host filesystem.
//!
//! Writes go to `<path>.tmp` and are renamed into place, so a crash never
//! leaves a half-written document behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::digest::TrustDigest;
use crate::error::{TrustError, TrustResult};
use crate::traits::TrustStore;

const DOCUMENT_VERSION: u32 = 1;

/// On-disk payload: hex digest to armored key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustDocument {
    pub version: u32,
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
}

impl Default for TrustDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            keys: BTreeMap::new(),
        }
    }
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TrustError {
    TrustError::Io {
        path: path.into(),
        source,
    }
}

/// A [`TrustStore`] backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileTrustStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl JsonFileTrustStore {
    /// A store at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document, or an empty one if the file does not exist yet.
    pub async fn load(&self) -> TrustResult<TrustDocument> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(TrustDocument::default())
            }
            Err(e) => return Err(io_err(&self.path, e)),
        };
        let document: TrustDocument = serde_json::from_str(&contents)?;
        if document.version != DOCUMENT_VERSION {
            return Err(TrustError::UnsupportedVersion(document.version));
        }
        for key in document.keys.keys() {
            TrustDigest::from_hex(key)?;
        }
        Ok(document)
    }

    async fn save(&self, document: &TrustDocument) -> TrustResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_err(dir, e))?;
        }
        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_err(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_err(&self.path, e))?;
        debug!(path = %self.path.display(), entries = document.keys.len(), "saved trust document");
        Ok(())
    }
}

#[async_trait]
impl TrustStore for JsonFileTrustStore {
    async fn get(&self, digest: &TrustDigest) -> TrustResult<Option<String>> {
        let _held = self.guard.lock().await;
        Ok(self.load().await?.keys.remove(&digest.to_hex()))
    }

    async fn set(&self, digest: &TrustDigest, armored_key: &str) -> TrustResult<()> {
        let _held = self.guard.lock().await;
        let mut document = self.load().await?;
        document.keys.insert(digest.to_hex(), armored_key.to_string());
        self.save(&document).await
    }

    async fn remove(&self, digest: &TrustDigest) -> TrustResult<bool> {
        let _held = self.guard.lock().await;
        let mut document = self.load().await?;
        if document.keys.remove(&digest.to_hex()).is_none() {
            return Ok(false);
        }
        self.save(&document).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(tmp: &TempDir) -> JsonFileTrustStore {
        JsonFileTrustStore::new(tmp.path().join("trust").join("keys.json"))
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let digest = TrustDigest::from_url("https://example.com/a.git");
        assert_eq!(store.get(&digest).await.unwrap(), None);
        assert!(!store.remove(&digest).await.unwrap());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn pins_survive_reopening() {
        let tmp = TempDir::new().unwrap();
        let digest = TrustDigest::from_url("https://example.com/a.git");
        store_in(&tmp).set(&digest, "armored").await.unwrap();

        let reopened = store_in(&tmp);
        assert_eq!(reopened.get(&digest).await.unwrap().as_deref(), Some("armored"));
        let document = reopened.load().await.unwrap();
        assert_eq!(document.version, 1);
        assert!(document.keys.contains_key(&digest.to_hex()));
    }

    #[tokio::test]
    async fn tmp_file_cleaned_up_after_save() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        store
            .set(&TrustDigest::from_url("u"), "k")
            .await
            .unwrap();
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn remove_rewrites_document() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        let a = TrustDigest::from_url("a");
        let b = TrustDigest::from_url("b");
        store.set(&a, "ka").await.unwrap();
        store.set(&b, "kb").await.unwrap();

        assert!(store.remove(&a).await.unwrap());
        assert_eq!(store.get(&a).await.unwrap(), None);
        assert_eq!(store.get(&b).await.unwrap().as_deref(), Some("kb"));
    }

    #[tokio::test]
    async fn rejects_unknown_version_and_bad_digests() {
        let tmp = TempDir::new().unwrap();
        let store = store_in(&tmp);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();

        std::fs::write(store.path(), r#"{"version":7,"keys":{}}"#).unwrap();
        assert!(matches!(
            store.load().await,
            Err(TrustError::UnsupportedVersion(7))
        ));

        std::fs::write(store.path(), r#"{"version":1,"keys":{"abc":"k"}}"#).unwrap();
        assert!(matches!(
            store.load().await,
            Err(TrustError::InvalidDigest(_))
        ));
    }
}
