use serde::{Deserialize, Serialize};

use crate::armor::{self, ArmorError, ArmorKind};
use crate::hasher::ContentHasher;

/// Ed25519 signing key (private).
///
/// The sync engine never signs anything; signing keys exist so that hosts
/// and tests can author signed history.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 verifying key (public).
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

/// Ed25519 detached signature.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_serde")] ed25519_dalek::Signature);

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.0.sign(message))
    }

    /// Sign a message and armor the detached signature.
    pub fn sign_armored(&self, message: &[u8]) -> String {
        self.sign(message).to_armored()
    }
}

impl PublicKey {
    /// Verify a signature on a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(message, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// Create from raw 32-byte public key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, SignatureError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|_| SignatureError::InvalidKey)?;
        Ok(Self(key))
    }

    /// Parse an armored public key.
    pub fn from_armored(text: &str) -> Result<Self, SignatureError> {
        let bytes = armor::decode(ArmorKind::PublicKey, text)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| SignatureError::InvalidKey)?;
        Self::from_bytes(arr)
    }

    /// Armored representation, suitable for pinning.
    pub fn to_armored(&self) -> String {
        armor::encode(ArmorKind::PublicKey, self.0.as_bytes())
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Short fingerprint of the key: 16 uppercase hex characters.
    pub fn key_id(&self) -> String {
        let digest = ContentHasher::KEY_ID.hash(self.0.as_bytes());
        hex::encode_upper(&digest[..8])
    }
}

impl Signature {
    /// Parse an armored detached signature.
    pub fn from_armored(text: &str) -> Result<Self, SignatureError> {
        let bytes = armor::decode(ArmorKind::Signature, text)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| SignatureError::MalformedSignature)?;
        Ok(Self(ed25519_dalek::Signature::from_bytes(&arr)))
    }

    pub fn to_armored(&self) -> String {
        armor::encode(ArmorKind::Signature, &self.0.to_bytes())
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.key_id())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}

/// Errors from key and signature handling.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid key")]
    InvalidKey,
    #[error("malformed signature")]
    MalformedSignature,
    #[error("armor error: {0}")]
    Armor(#[from] ArmorError),
}

mod signature_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(sig: &ed25519_dalek::Signature, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(sig.to_bytes()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ed25519_dalek::Signature, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 64-byte signature"))?;
        Ok(ed25519_dalek::Signature::from_bytes(&arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let sk = SigningKey::generate();
        let pk = sk.public_key();
        let message = b"tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904";
        let sig = sk.sign(message);
        assert!(pk.verify(message, &sig).is_ok());
    }

    #[test]
    fn verify_fails_on_wrong_message() {
        let sk = SigningKey::generate();
        let sig = sk.sign(b"correct message");
        assert_eq!(
            sk.public_key().verify(b"wrong message", &sig),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn verify_fails_with_wrong_key() {
        let sk1 = SigningKey::generate();
        let sk2 = SigningKey::generate();
        let sig = sk1.sign(b"message");
        assert!(sk2.public_key().verify(b"message", &sig).is_err());
    }

    #[test]
    fn armored_key_parses_back() {
        let pk = SigningKey::from_bytes([9; 32]).public_key();
        let parsed = PublicKey::from_armored(&pk.to_armored()).unwrap();
        assert_eq!(parsed, pk);
        assert_eq!(parsed.key_id(), pk.key_id());
    }

    #[test]
    fn armored_signature_verifies() {
        let sk = SigningKey::from_bytes([3; 32]);
        let armored = sk.sign_armored(b"payload");
        let sig = Signature::from_armored(&armored).unwrap();
        assert!(sk.public_key().verify(b"payload", &sig).is_ok());
    }

    #[test]
    fn key_armor_is_not_a_signature() {
        let pk = SigningKey::generate().public_key();
        let err = Signature::from_armored(&pk.to_armored()).unwrap_err();
        assert!(matches!(err, SignatureError::Armor(ArmorError::MissingHeader(_))));
    }

    #[test]
    fn wrong_length_key_rejected() {
        let armored = armor::encode(ArmorKind::PublicKey, &[1; 16]);
        assert_eq!(PublicKey::from_armored(&armored), Err(SignatureError::InvalidKey));
    }

    #[test]
    fn key_id_is_stable_and_distinct() {
        let a = SigningKey::from_bytes([1; 32]).public_key();
        let b = SigningKey::from_bytes([2; 32]).public_key();
        assert_eq!(a.key_id().len(), 16);
        assert_eq!(a.key_id(), a.key_id());
        assert_ne!(a.key_id(), b.key_id());
    }

    #[test]
    fn signature_serde_roundtrip() {
        let sig = SigningKey::generate().sign(b"test");
        let json = serde_json::to_string(&sig).unwrap();
        let parsed: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn debug_redacts_signing_key() {
        let debug = format!("{:?}", SigningKey::generate());
        assert!(debug.contains("redacted"));
    }
}
