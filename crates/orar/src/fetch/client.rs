//! HTTP client for schedule and academic calendar pages.
//!
//! Every request is a single attempt:
//! 1. GET the page, following at most 10 redirects
//! 2. Reject anything that doesn't end in a 2xx status
//! 3. Return the body as text
//!
//! Nothing here retries. The per-request timeout is always set.

use crate::config::OrarConfig;
use crate::error::OrarError;
use rand::Rng;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Configuration for the document fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Total time allowed for one request, body included
    pub timeout: Duration,
    /// Time allowed to establish the connection
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&OrarConfig::default())
    }
}

impl From<&OrarConfig> for FetchConfig {
    fn from(config: &OrarConfig) -> Self {
        let timeout = config.request_timeout();
        Self {
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(10)),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Fetches raw HTML documents.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    /// Creates a fetcher with the default configuration.
    pub fn new() -> Result<Self, OrarError> {
        Self::with_config(FetchConfig::default())
    }

    /// Creates a fetcher with custom configuration.
    pub fn with_config(config: FetchConfig) -> Result<Self, OrarError> {
        let client = Client::builder()
            .redirect(Policy::limited(10))
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| OrarError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    /// Fetches one document and returns its body.
    ///
    /// # Arguments
    /// * `url` - Absolute URL of the page
    ///
    /// # Returns
    /// * `Ok(String)` - The page body
    /// * `Err(OrarError::Network)` - On timeout, transport failure or a non-2xx final status
    pub async fn fetch(&self, url: &str) -> Result<String, OrarError> {
        let correlation_id = generate_correlation_id();
        let start = Instant::now();

        debug!(
            correlation_id = %correlation_id,
            url = %url,
            "Fetching document"
        );

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(
                correlation_id = %correlation_id,
                url = %url,
                error = %e,
                "Request failed"
            );
            OrarError::Network {
                message: format!("{}: {}", url, e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                correlation_id = %correlation_id,
                url = %url,
                status = %status,
                "Unexpected status"
            );
            return Err(OrarError::Network {
                message: format!("{} returned status {}", url, status),
            });
        }

        let body = response.text().await?;

        info!(
            correlation_id = %correlation_id,
            url = %url,
            bytes = body.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched document"
        );

        Ok(body)
    }
}

/// Generates a unique correlation ID for request tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_from_orar_config() {
        let config = OrarConfig {
            request_timeout_secs: 5,
            ..OrarConfig::default()
        };
        let fetch = FetchConfig::from(&config);
        assert_eq!(fetch.timeout, Duration::from_secs(5));
        assert_eq!(fetch.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_correlation_ids_differ() {
        assert_ne!(generate_correlation_id(), generate_correlation_id());
    }

    #[tokio::test]
    async fn test_invalid_url_is_network_error() {
        let fetcher = DocumentFetcher::new().unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, OrarError::Network { .. }));
    }
}
