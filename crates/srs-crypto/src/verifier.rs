//! The signature-verification seam.
//!
//! The sync engine never touches key material directly. It parses the pinned
//! key and each commit's detached signature through a [`SignatureVerifier`]
//! and asks it whether the signature covers the commit payload.

use async_trait::async_trait;

use crate::signer::{PublicKey, Signature, SignatureError};

/// Outcome of a verification call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verification {
    pub valid: bool,
    /// Fingerprint of the key the signature was checked against.
    pub key_id: String,
}

/// Parses armored keys and signatures and verifies payloads.
///
/// Every method is a suspension point: implementations backed by an external
/// process or service are free to await.
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Parse an armored public key.
    async fn read_key(&self, armored: &str) -> Result<PublicKey, SignatureError>;

    /// Parse an armored detached signature.
    async fn read_signature(&self, armored: &str) -> Result<Signature, SignatureError>;

    /// Check `signature` over `payload` against `key`.
    ///
    /// A signature that does not verify is reported as `valid: false`, not as
    /// an error.
    async fn verify(
        &self,
        payload: &[u8],
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<Verification, SignatureError>;
}

/// In-process Ed25519 verifier over the `srs` armor format.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

#[async_trait]
impl SignatureVerifier for Ed25519Verifier {
    async fn read_key(&self, armored: &str) -> Result<PublicKey, SignatureError> {
        PublicKey::from_armored(armored)
    }

    async fn read_signature(&self, armored: &str) -> Result<Signature, SignatureError> {
        Signature::from_armored(armored)
    }

    async fn verify(
        &self,
        payload: &[u8],
        signature: &Signature,
        key: &PublicKey,
    ) -> Result<Verification, SignatureError> {
        let valid = key.verify(payload, signature).is_ok();
        Ok(Verification {
            valid,
            key_id: key.key_id(),
        })
    }
}
