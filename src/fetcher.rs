//! Page fetching capability used by the extractors.
//!
//! `PageFetcher` is what the extraction code depends on; `SiteFetcher` is the
//! production implementation that talks to the streaming site through
//! [`EnhancedHttpClient`].

use crate::http_client::EnhancedHttpClient;
use async_trait::async_trait;
use reqwest::StatusCode;

/// Why a page could not be fetched
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("challenge page still served for {0}")]
    Challenge(String),

    #[error("empty body for {0}")]
    EmptyBody(String),
}

/// Returns raw markup for a site path
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Fetches pages from a fixed site origin
pub struct SiteFetcher {
    base_url: String,
    client: EnhancedHttpClient,
}

impl SiteFetcher {
    pub fn new(base_url: impl Into<String>, client: EnhancedHttpClient) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a slug against the site origin. The slug is always a path
    /// below `base_url`, even when it looks like a URL of its own.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl PageFetcher for SiteFetcher {
    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url_for(path);
        log::debug!("Fetching {}", url);

        let page = self.client.get_with_retry(&url).await?;

        if page.challenged {
            return Err(FetchError::Challenge(url));
        }
        if !page.status.is_success() {
            return Err(FetchError::Status {
                url,
                status: page.status,
            });
        }
        if page.body.trim().is_empty() {
            return Err(FetchError::EmptyBody(url));
        }

        log::debug!("Fetched {} ({} bytes)", url, page.body.len());
        Ok(page.body)
    }
}
