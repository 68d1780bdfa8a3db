//! Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use srs_store::path;

use crate::error::{SyncError, SyncResult};

/// Process-wide settings for a [`SyncEngine`](crate::SyncEngine).
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes:
///
/// ```
/// use srs_sync::SyncConfig;
///
/// let config = SyncConfig::from_toml_str(r#"
///     proxy = "https://proxy.example.com"
///     network_timeout_secs = 30
/// "#).unwrap();
/// assert_eq!(config.storage_root, "/");
/// assert_eq!(config.remote_name, "origin");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Proxy for backend network traffic and HTTP trust anchors.
    pub proxy: Option<String>,
    /// Anchor used by clone when the caller does not supply one.
    pub default_trust_anchor: Option<TrustAnchor>,
    /// Upper bound on each network operation.
    pub network_timeout_secs: u64,
    /// Directory under which repositories are materialized.
    pub storage_root: String,
    /// Remote whose URL keys the trust pin.
    pub remote_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            default_trust_anchor: None,
            network_timeout_secs: 60,
            storage_root: path::ROOT.to_string(),
            remote_name: "origin".to_string(),
        }
    }
}

impl SyncConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SyncResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub async fn load(file: impl AsRef<Path>) -> SyncResult<Self> {
        let file = file.as_ref();
        let text = tokio::fs::read_to_string(file)
            .await
            .map_err(|e| SyncError::Config(format!("{}: {e}", file.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> SyncResult<()> {
        path::normalize(&self.storage_root)
            .map_err(|e| SyncError::Config(format!("storage_root: {e}")))?;
        if self.network_timeout_secs == 0 {
            return Err(SyncError::Config(
                "network_timeout_secs must be positive".into(),
            ));
        }
        srs_refs::validate_remote_name(&self.remote_name)
            .map_err(|e| SyncError::Config(format!("remote_name: {e}")))?;
        Ok(())
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }
}

/// Where to obtain the public key a repository's history must verify
/// against on first clone.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustAnchor(String);

/// The form a [`TrustAnchor`] locator takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorKind<'a> {
    /// The armored key itself.
    Inline(&'a str),
    /// An `http://` or `https://` URL.
    Http(&'a str),
    /// A host file path, with any `file://` prefix removed.
    File(&'a Path),
}

impl TrustAnchor {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> AnchorKind<'_> {
        let locator = self.0.trim();
        if locator.starts_with("-----BEGIN") {
            AnchorKind::Inline(locator)
        } else if locator.starts_with("http://") || locator.starts_with("https://") {
            AnchorKind::Http(locator)
        } else {
            AnchorKind::File(Path::new(
                locator.strip_prefix("file://").unwrap_or(locator),
            ))
        }
    }
}

impl std::fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            AnchorKind::Inline(_) => f.write_str("TrustAnchor(<inline key>)"),
            _ => write!(f, "TrustAnchor({})", self.0),
        }
    }
}

impl From<&str> for TrustAnchor {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}
