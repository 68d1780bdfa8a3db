//! Commit signature validation against a single trusted key.

use srs_crypto::{PublicKey, SignatureVerifier};
use srs_types::CommitRecord;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

/// Checks commits against one trusted public key.
///
/// A commit passes only if it carries a detached signature that parses and
/// verifies over the commit payload with this key. Anything else is an
/// error naming the commit.
pub struct CommitValidator<'a> {
    verifier: &'a dyn SignatureVerifier,
    key: PublicKey,
    key_id: String,
}

impl<'a> CommitValidator<'a> {
    /// Parse `armored_key` through `verifier`.
    pub async fn new(verifier: &'a dyn SignatureVerifier, armored_key: &str) -> SyncResult<Self> {
        let key = verifier
            .read_key(armored_key)
            .await
            .map_err(|e| SyncError::TrustAnchor(format!("unreadable public key: {e}")))?;
        let key_id = key.key_id();
        Ok(Self {
            verifier,
            key,
            key_id,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub async fn validate(&self, record: &CommitRecord) -> SyncResult<()> {
        let commit = record.oid();
        let Some(armored) = record.commit.detached_signature() else {
            warn!(commit = %commit.short(), "commit is unsigned");
            return Err(SyncError::MissingSignature {
                commit: commit.clone(),
            });
        };

        let invalid = |reason: String| {
            warn!(commit = %commit.short(), %reason, "signature rejected");
            SyncError::InvalidSignature {
                commit: commit.clone(),
                reason,
            }
        };

        let signature = self
            .verifier
            .read_signature(armored)
            .await
            .map_err(|e| invalid(format!("unreadable signature: {e}")))?;
        let outcome = self
            .verifier
            .verify(&record.payload, &signature, &self.key)
            .await
            .map_err(|e| invalid(e.to_string()))?;
        if !outcome.valid {
            return Err(invalid(format!(
                "signature does not verify against key {}",
                outcome.key_id
            )));
        }

        debug!(commit = %commit.short(), key = %self.key_id, "signature verified");
        Ok(())
    }
}
