//! HTTP fetcher for post images
//!
//! Instagram's CDN rejects requests that do not look like a browser, so the
//! client sends browser headers and a Referer. Transient failures are retried
//! with exponential backoff. When the media host cannot be resolved, the same
//! path is tried against a list of known CDN edge hosts.

use crate::config::MediaConfig;
use crate::media::{MediaError, MediaResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use std::time::Duration;
use url::Url;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// Statuses worth another attempt
const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Downloads media with retry and CDN fallback
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    client: Client,
    max_attempts: u32,
    backoff_factor: Duration,
    cdn_hosts: Vec<String>,
}

impl MediaFetcher {
    /// Builds a fetcher from the media settings
    ///
    /// # Arguments
    ///
    /// * `config` - Timeout, retry and CDN fallback settings
    ///
    /// # Returns
    ///
    /// * `Ok(MediaFetcher)` - Ready to fetch
    /// * `Err(MediaError)` - Failed to build the HTTP client
    pub fn new(config: &MediaConfig) -> MediaResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(IMAGE_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.instagram.com/"));

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            max_attempts: config.max_attempts.max(1),
            backoff_factor: Duration::from_millis(config.backoff_factor_ms),
            cdn_hosts: config.cdn_fallback_hosts.clone(),
        })
    }

    /// Fetches the bytes behind `url`
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 429, 500, 502, 503, 504 | Retry with backoff |
    /// | Timeout | Retry with backoff |
    /// | Other HTTP error | Immediate failure |
    /// | DNS failure | Try each CDN fallback host once |
    pub async fn fetch(&self, url: &str) -> MediaResult<Vec<u8>> {
        match self.fetch_with_retry(url).await {
            Err(MediaError::Request(e)) if is_dns_error(&e) => {
                tracing::warn!("Could not resolve media host for {}, trying CDN fallbacks", url);
                self.fetch_from_fallbacks(url, e).await
            }
            other => other,
        }
    }

    async fn fetch_from_fallbacks(
        &self,
        url: &str,
        original: reqwest::Error,
    ) -> MediaResult<Vec<u8>> {
        for alternate in cdn_alternates(url, &self.cdn_hosts) {
            match self.fetch_once(&alternate).await {
                Ok(bytes) => {
                    tracing::debug!("Fetched {} from fallback {}", url, alternate);
                    return Ok(bytes);
                }
                Err(e) => tracing::debug!("Fallback {} failed: {}", alternate, e),
            }
        }
        Err(MediaError::Request(original))
    }

    async fn fetch_with_retry(&self, url: &str) -> MediaResult<Vec<u8>> {
        let mut attempt = 1;
        loop {
            let result = self.fetch_once(url).await;
            let retryable = match &result {
                Ok(_) => return result,
                Err(MediaError::Status { status, .. }) => is_retryable_status(*status),
                Err(MediaError::Request(e)) => e.is_timeout(),
                Err(_) => false,
            };

            if !retryable || attempt >= self.max_attempts {
                return result;
            }

            let delay = self.backoff(attempt);
            tracing::debug!(
                "Attempt {}/{} for {} failed, retrying in {:?}",
                attempt,
                self.max_attempts,
                url,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn fetch_once(&self, url: &str) -> MediaResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Delay before attempt `attempt + 1`: `factor * 2^(attempt-1)`
    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_factor * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

fn is_retryable_status(status: u16) -> bool {
    RETRY_STATUSES.contains(&status)
}

/// Walks the error chain looking for a name resolution failure
fn is_dns_error(error: &reqwest::Error) -> bool {
    let mut source: Option<&dyn std::error::Error> = Some(error);
    while let Some(err) = source {
        let message = err.to_string().to_lowercase();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        source = err.source();
    }
    false
}

/// Rewrites `url` onto each fallback host, keeping scheme, port, path and query
///
/// Returns nothing when `url` cannot be parsed.
///
/// # Example
///
/// ```
/// use insta_scraper::media::cdn_alternates;
///
/// let hosts = vec!["scontent-iad3-1.cdninstagram.com".to_string()];
/// let alts = cdn_alternates("https://broken.example/v/t51/img.jpg?stp=1", &hosts);
/// assert_eq!(alts, vec!["https://scontent-iad3-1.cdninstagram.com/v/t51/img.jpg?stp=1"]);
/// ```
pub fn cdn_alternates(url: &str, hosts: &[String]) -> Vec<String> {
    let Ok(parsed) = Url::parse(url) else {
        return Vec::new();
    };

    hosts
        .iter()
        .filter(|host| parsed.host_str() != Some(host.as_str()))
        .filter_map(|host| {
            let mut alternate = parsed.clone();
            alternate.set_host(Some(host)).ok()?;
            Some(alternate.to_string())
        })
        .collect()
}
