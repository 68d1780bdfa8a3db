//! Cryptographic primitives for signed repository sync.
//!
//! Provides domain-separated BLAKE3 hashing, Ed25519 signing and
//! verification, a small ASCII armor for keys and detached signatures, and
//! the [`SignatureVerifier`] seam the sync engine verifies commits through.
//!
//! All crypto operations wrap established libraries - no custom cryptography.

pub mod armor;
pub mod hasher;
pub mod signer;
pub mod verifier;

pub use armor::{ArmorError, ArmorKind};
pub use hasher::ContentHasher;
pub use signer::{PublicKey, Signature, SignatureError, SigningKey};
pub use verifier::{Ed25519Verifier, SignatureVerifier, Verification};
