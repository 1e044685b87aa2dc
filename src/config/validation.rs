use crate::config::types::{Config, CrawlerConfig, SiteConfig, StoreConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_site_config(&config.site)?;
    validate_store_config(&config.store)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.max_pages_per_query < 1 {
        return Err(ConfigError::Validation(
            "max_pages_per_query must be >= 1".to_string(),
        ));
    }

    if config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be <= 10, got {}",
            config.retries
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates the search site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_domain).map_err(|e| {
        ConfigError::InvalidUrl(format!(
            "Invalid base_domain '{}': {}",
            config.base_domain, e
        ))
    })?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "base_domain '{}' must use http or https",
            config.base_domain
        )));
    }

    // The base is prefixed to relative links, so it must not carry a path
    if url.path() != "/" || url.query().is_some() {
        return Err(ConfigError::Validation(format!(
            "base_domain '{}' must be scheme and host only",
            config.base_domain
        )));
    }

    if config.bodies.is_empty() {
        return Err(ConfigError::Validation(
            "at least one body category is required".to_string(),
        ));
    }

    Ok(())
}

/// Validates content store configuration
fn validate_store_config(config: &StoreConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    validate_bucket_name(&config.bucket)?;

    if config.principal.trim().is_empty() {
        return Err(ConfigError::Validation(
            "principal cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a bucket name: 3-63 chars of lowercase letters, digits, '-' and '.'
fn validate_bucket_name(bucket: &str) -> Result<(), ConfigError> {
    if bucket.len() < 3 || bucket.len() > 63 {
        return Err(ConfigError::Validation(format!(
            "bucket '{}' must be 3 to 63 characters long",
            bucket
        )));
    }

    if !bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(ConfigError::Validation(format!(
            "bucket '{}' may only contain lowercase letters, digits, '-' and '.'",
            bucket
        )));
    }

    if bucket.starts_with(&['-', '.'][..]) || bucket.ends_with(&['-', '.'][..]) {
        return Err(ConfigError::Validation(format!(
            "bucket '{}' cannot start or end with '.' or '-'",
            bucket
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
