use std::fmt;

use srs_crypto::ContentHasher;

use crate::error::{TrustError, TrustResult};

/// Trust store key for a repository: BLAKE3 of the source URL under the
/// `srs-trust-key-v1` domain.
///
/// The URL is hashed verbatim; `https://host/site` and `https://host/site/`
/// are different repositories as far as trust is concerned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrustDigest([u8; 32]);

impl TrustDigest {
    pub fn from_url(url: &str) -> Self {
        Self(ContentHasher::TRUST_KEY.hash(url.as_bytes()))
    }

    pub fn from_hex(value: &str) -> TrustResult<Self> {
        let bytes = hex::decode(value).map_err(|_| TrustError::InvalidDigest(value.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TrustError::InvalidDigest(value.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for TrustDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TrustDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrustDigest({})", &self.to_hex()[..16])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic_and_url_sensitive() {
        let a = TrustDigest::from_url("https://example.com/site.git");
        assert_eq!(a, TrustDigest::from_url("https://example.com/site.git"));
        assert_ne!(a, TrustDigest::from_url("https://example.com/site.git/"));
        assert_eq!(a.to_hex().len(), 64);
    }

    #[test]
    fn digest_is_domain_separated() {
        let url = "https://example.com/site.git";
        let plain = blake3::hash(url.as_bytes());
        assert_ne!(TrustDigest::from_url(url).as_bytes(), plain.as_bytes());
    }

    #[test]
    fn hex_round_trip_and_rejects_bad_input() {
        let digest = TrustDigest::from_url("u");
        assert_eq!(TrustDigest::from_hex(&digest.to_hex()).unwrap(), digest);
        assert!(TrustDigest::from_hex("abcd").is_err());
        assert!(TrustDigest::from_hex(&"zz".repeat(32)).is_err());
    }
}
