/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"srs-commit-v1"`) that is
/// prepended to every hash computation, so identical bytes hashed for
/// different purposes never collide.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for commit payloads.
    pub const COMMIT: Self = Self {
        domain: "srs-commit-v1",
    };
    /// Hasher for trust-store keys derived from repository URLs.
    pub const TRUST_KEY: Self = Self {
        domain: "srs-trust-key-v1",
    };
    /// Hasher for public-key fingerprints.
    pub const KEY_ID: Self = Self {
        domain: "srs-key-id-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash raw bytes and hex-encode the digest.
    pub fn hash_hex(&self, data: &[u8]) -> String {
        hex::encode(self.hash(data))
    }

    /// Verify that data produces the expected digest.
    pub fn verify(&self, data: &[u8], expected: &[u8; 32]) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
