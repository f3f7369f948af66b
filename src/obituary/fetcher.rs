//! HTTP page fetching
//!
//! Fetches obituary pages one at a time with a caller-supplied User-Agent.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::types::FetchError;

/// Source of raw page markup
///
/// Every failure (bad URL, timeout, non-2xx status, connection error) is
/// reported as a `FetchError`; callers treat them all the same way.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url`, presenting `user_agent`
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<String, FetchError>;
}

/// `PageFetcher` backed by a reqwest client
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Create a fetcher with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Parse `url`, accepting only http and https
    pub fn parse_url(url: &str) -> Result<Url, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        Ok(parsed)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let parsed = Self::parse_url(url)?;

        let response = self
            .client
            .get(parsed)
            .header(USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(url.to_string())
                } else {
                    FetchError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        debug!("Fetched {} with status code: {}", url, status);
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
