use crate::config::types::{Config, CrawlerConfig, SiteEntry, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_sites(&config.site)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    if config.page_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "page_limit must be >= 1, got {}",
            config.page_limit
        )));
    }

    if config.target_file_types.is_empty() {
        return Err(ConfigError::Validation(
            "target_file_types must name at least one file type".to_string(),
        ));
    }

    if config.log_interval < 1 {
        return Err(ConfigError::Validation(format!(
            "log_interval must be >= 1, got {}",
            config.log_interval
        )));
    }

    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 100, got {}",
            config.max_workers
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

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.raw_folder.is_empty() {
        return Err(ConfigError::Validation(
            "raw_folder cannot be empty".to_string(),
        ));
    }

    if config.dataset_folder.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_folder cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates site entries
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[site]] entry is required".to_string(),
        ));
    }

    for entry in sites {
        if entry.name.is_empty() {
            return Err(ConfigError::Validation(
                "site name cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", entry.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Site URL '{}' must use the http or https scheme",
                entry.url
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::Validation(format!(
                "Site URL '{}' has no host",
                entry.url
            )));
        }

        if let Some(delay) = entry.crawl_delay {
            if !delay.is_finite() || delay < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "Site '{}' crawl-delay must be a non-negative number, got {}",
                    entry.name, delay
                )));
            }
        }
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

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str, url: &str) -> SiteEntry {
        SiteEntry {
            name: name.to_string(),
            url: url.to_string(),
            split: "dev".to_string(),
            crawl_delay: None,
        }
    }

    #[test]
    fn test_validate_sites_accepts_http_and_https() {
        assert!(validate_sites(&[site("A", "https://example.com")]).is_ok());
        assert!(validate_sites(&[site("B", "http://127.0.0.1:8080")]).is_ok());
    }

    #[test]
    fn test_validate_sites_rejects_bad_entries() {
        assert!(validate_sites(&[]).is_err());
        assert!(validate_sites(&[site("", "https://example.com")]).is_err());
        assert!(validate_sites(&[site("A", "not a url")]).is_err());
        assert!(validate_sites(&[site("A", "ftp://example.com")]).is_err());
    }

    #[test]
    fn test_validate_sites_rejects_negative_crawl_delay() {
        let mut entry = site("A", "https://example.com");
        entry.crawl_delay = Some(-1.0);
        assert!(validate_sites(&[entry]).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
