//! HTTP client construction and the retrying fetch loop

use crate::config::UserAgentConfig;
use crate::fetch::{FetchError, FetchResult};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tracing::debug;

/// Attempt budget for one fetch
pub const MAX_FETCH_ATTEMPTS: usize = 5;

/// Bodies shorter than this count as a failed attempt (error pages from
/// intermediaries are typically empty or near-empty)
pub const MIN_BODY_BYTES: usize = 10;

/// Seconds waited between requests when neither the site config nor
/// robots.txt names a delay
pub const DEFAULT_CRAWL_DELAY_SECS: f64 = 1.0;

/// Builds the HTTP client shared by all site engines
///
/// Redirects are followed (up to 10 hops), matching the behavior the page
/// cache was built around: the stored body is whatever the final hop served.
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with a bounded retry loop
///
/// Sleeps `crawl_delay` seconds before every attempt, including the first;
/// an attempt succeeds when the response body is at least [`MIN_BODY_BYTES`]
/// long. HTTP status is not inspected beyond redirect following. When the
/// budget is exhausted the returned error carries the last diagnostic seen.
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - The URL to fetch
/// * `crawl_delay` - Seconds to sleep before each attempt
/// * `max_attempts` - Retry budget
pub async fn fetch_with_retries(
    client: &Client,
    url: &str,
    crawl_delay: f64,
    max_attempts: usize,
) -> FetchResult<Vec<u8>> {
    let mut last_diagnostic = String::from("no attempt made");

    for attempt in 1..=max_attempts {
        if crawl_delay > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(crawl_delay)).await;
        }

        match client.get(url).send().await {
            Ok(response) => match response.bytes().await {
                Ok(body) if body.len() >= MIN_BODY_BYTES => {
                    return Ok(body.to_vec());
                }
                Ok(body) => {
                    last_diagnostic = format!("undersized body ({} bytes)", body.len());
                }
                Err(e) => {
                    last_diagnostic = classify_error(&e);
                }
            },
            Err(e) => {
                last_diagnostic = classify_error(&e);
            }
        }

        debug!(
            url,
            attempt,
            max_attempts,
            diagnostic = %last_diagnostic,
            "Fetch attempt failed"
        );
    }

    Err(FetchError::ConnectionFailed {
        url: url.to_string(),
        attempts: max_attempts,
        last: last_diagnostic,
    })
}

/// Maps a reqwest error to a short diagnostic string
fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        "connection refused".to_string()
    } else if e.is_redirect() {
        "redirect limit exceeded".to_string()
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestHarvester".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_with_retries_reports_last_diagnostic() {
        let client = build_http_client(&create_test_config()).unwrap();

        // Nothing listens on this port; every attempt fails to connect
        let result = fetch_with_retries(&client, "http://127.0.0.1:9/never", 0.0, 2).await;

        match result {
            Err(FetchError::ConnectionFailed { attempts, last, .. }) => {
                assert_eq!(attempts, 2);
                assert!(!last.is_empty());
            }
            other => panic!("expected ConnectionFailed, got {:?}", other.map(|b| b.len())),
        }
    }
}
