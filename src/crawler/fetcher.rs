//! HTTP fetcher implementation
//!
//! This module is the fetch layer every pipeline stage goes through:
//! - Building HTTP clients with proper user agent strings
//! - GET requests returning status, content type and raw body
//! - Retrying transient failures (server errors, timeouts)
//! - Error classification
//!
//! Pipeline stages never retry on their own; a `FetchError` out of here is
//! final for that unit of work.

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// A fully received 2xx HTTP response
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    /// Final URL after redirects
    pub final_url: String,
    /// Content-Type header value (empty if absent)
    pub content_type: String,
    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A fetch that did not produce a usable response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP {status_code} for {url}")]
    Http { url: String, status_code: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Whether another attempt might succeed
    fn is_transient(&self) -> bool {
        match self {
            Self::Http { status_code, .. } => *status_code >= 500,
            Self::Timeout { .. } => true,
            Self::Network { .. } => false,
        }
    }
}

/// Retry behavior of the fetch layer
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub retries: u32,
    pub delay: Duration,
}

impl From<&CrawlerConfig> for RetryPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            retries: config.retries,
            delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use wrc_harvest::config::{CrawlerConfig, UserAgentConfig};
/// use wrc_harvest::crawler::build_http_client;
///
/// let crawler = CrawlerConfig {
///     max_concurrent_requests: 4,
///     request_timeout_secs: 30,
///     retries: 2,
///     retry_delay_ms: 1000,
///     max_pages_per_query: 2000,
/// };
/// let user_agent = UserAgentConfig {
///     crawler_name: "wrc-harvest".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "ops@example.com".to_string(),
/// };
///
/// let client = build_http_client(&crawler, &user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL; ContactEmail)
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Fetches a URL, retrying transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Success |
/// | HTTP 4xx | Immediate failure |
/// | HTTP 5xx | Retry up to `policy.retries` times |
/// | Timeout | Retry up to `policy.retries` times |
/// | Other network error | Immediate failure |
pub async fn fetch_url(
    client: &Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<FetchedResponse, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_transient() && attempt < policy.retries => {
                attempt += 1;
                tracing::debug!(
                    "Retrying {} after {} (attempt {}/{})",
                    url,
                    e,
                    attempt,
                    policy.retries
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn fetch_once(client: &Client, url: &str) -> Result<FetchedResponse, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            url: url.to_string(),
            status_code: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_error(url, e))?;

    Ok(FetchedResponse {
        final_url,
        content_type,
        body: body.to_vec(),
    })
}

fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else if let Some(status) = e.status() {
        FetchError::Http {
            url: url.to_string(),
            status_code: status.as_u16(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// True for statuses the site uses when a document is gone
pub fn is_missing(error: &FetchError) -> bool {
    matches!(
        error,
        FetchError::Http { status_code, .. }
            if *status_code == StatusCode::NOT_FOUND.as_u16() || *status_code == StatusCode::GONE.as_u16()
    )
}
