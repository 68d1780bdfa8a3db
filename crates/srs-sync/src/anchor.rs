//! Turning a [`TrustAnchor`] into armored key text.

use async_trait::async_trait;
use tracing::debug;

use crate::config::{AnchorKind, SyncConfig, TrustAnchor};
use crate::error::{SyncError, SyncResult};

/// Fetches the key a trust anchor points at.
#[async_trait]
pub trait AnchorResolver: Send + Sync {
    /// The armored key text. Never empty on success.
    async fn resolve(&self, anchor: &TrustAnchor) -> SyncResult<String>;
}

/// Resolves inline keys, host files and HTTP(S) URLs.
///
/// HTTP requests honour the configured proxy and network timeout.
#[derive(Clone, Debug)]
pub struct DefaultAnchorResolver {
    client: reqwest::Client,
}

impl DefaultAnchorResolver {
    pub fn new(config: &SyncConfig) -> SyncResult<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.network_timeout());
        builder = match &config.proxy {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url.as_str())
                    .map_err(|e| SyncError::Config(format!("proxy {proxy_url}: {e}")))?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };
        let client = builder
            .build()
            .map_err(|e| SyncError::Config(format!("http client: {e}")))?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> SyncResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| SyncError::TrustAnchor(format!("{url}: {e}")))?;
        response
            .text()
            .await
            .map_err(|e| SyncError::TrustAnchor(format!("{url}: {e}")))
    }
}

#[async_trait]
impl AnchorResolver for DefaultAnchorResolver {
    async fn resolve(&self, anchor: &TrustAnchor) -> SyncResult<String> {
        let text = match anchor.kind() {
            AnchorKind::Inline(key) => key.to_string(),
            AnchorKind::Http(url) => {
                debug!(url, "fetching trust anchor");
                self.fetch(url).await?
            }
            AnchorKind::File(file) => tokio::fs::read_to_string(file)
                .await
                .map_err(|e| SyncError::TrustAnchor(format!("{}: {e}", file.display())))?,
        };
        if text.trim().is_empty() {
            return Err(SyncError::TrustAnchor(format!(
                "{} yielded no key material",
                anchor.as_str()
            )));
        }
        Ok(text)
    }
}
