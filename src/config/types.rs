use crate::query::BodyCategory;
use serde::Deserialize;

/// Main configuration structure for wrc-harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub site: SiteConfig,
    pub store: StoreConfig,
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight at once
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Retries for server errors and timeouts
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Pause between retries (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Upper bound on result pages requested for one query
    #[serde(rename = "max-pages-per-query", default = "default_max_pages")]
    pub max_pages_per_query: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Search site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host of the site, e.g. `https://www.workplacerelations.ie`
    #[serde(rename = "base-domain")]
    pub base_domain: String,

    /// Body categories to search
    #[serde(default = "default_bodies")]
    pub bodies: Vec<BodyCategory>,
}

/// Content store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database backing the store
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Namespace documents are written into
    pub bucket: String,

    /// Identity that owns namespaces created by this harvester
    #[serde(default = "default_principal")]
    pub principal: String,
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    2000
}

fn default_max_pages() -> u64 {
    2000
}

fn default_bodies() -> Vec<BodyCategory> {
    BodyCategory::ALL.to_vec()
}

fn default_principal() -> String {
    "wrc-harvest".to_string()
}
