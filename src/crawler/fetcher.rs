//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with the body read into a capacity-bounded buffer
//! - Error classification into `FetchError`

use crate::config::UserAgentConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Raw content downloaded for one URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedContent {
    /// Response body, at most the requested limit
    pub body: Vec<u8>,

    /// Set when the body was cut off at the limit
    pub truncated: bool,
}

/// Capability to download a URL
///
/// The dispatcher only depends on this trait, so tests can substitute a
/// scripted fetcher for the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Downloads `url`, keeping at most `limit` bytes of the body
    async fn fetch(&self, url: &str, limit: usize) -> Result<FetchedContent, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall per-request timeout
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Sends a GET request and streams the body into a bounded buffer
    ///
    /// | Condition               | Result                 |
    /// |-------------------------|------------------------|
    /// | connect/timeout failure | `FetchError::Transport`|
    /// | non-2xx status          | `FetchError::Status`   |
    /// | body read failure       | `FetchError::Body`     |
    /// | body over `limit`       | `truncated = true`     |
    async fn fetch(&self, url: &str, limit: usize) -> Result<FetchedContent, FetchError> {
        let mut response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Transport {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut content = FetchedContent::default();
        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })? {
            let room = limit - content.body.len();
            if chunk.len() > room {
                content.body.extend_from_slice(&chunk[..room]);
                content.truncated = true;
                break;
            }
            content.body.extend_from_slice(&chunk);
        }

        tracing::debug!(
            "Fetched {} bytes from {} (HTTP {})",
            content.body.len(),
            url,
            status.as_u16()
        );
        Ok(content)
    }
}
