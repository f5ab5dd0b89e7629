use crate::config::types::{ApiConfig, MediaConfig, PollingConfig, Settings};
use crate::ConfigError;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Public profile URL, e.g. `https://www.instagram.com/natgeo/`
static PROFILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?instagram\.com/[a-zA-Z0-9_.]+/?$")
        .expect("profile URL pattern is valid")
});

/// Validates the entire settings structure
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    validate_api_config(&settings.api)?;
    validate_polling_config(&settings.polling)?;
    validate_media_config(&settings.media)?;
    Ok(())
}

/// Checks whether a string is a valid Instagram profile URL
///
/// Surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use insta_scraper::config::is_valid_profile_url;
///
/// assert!(is_valid_profile_url("https://www.instagram.com/natgeo/"));
/// assert!(!is_valid_profile_url("https://www.instagram.com/p/ABC123/extra"));
/// ```
pub fn is_valid_profile_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && PROFILE_URL.is_match(url)
}

fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.actor_id.trim().is_empty() {
        return Err(ConfigError::Validation(
            "actor-id cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_polling_config(config: &PollingConfig) -> Result<(), ConfigError> {
    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "polling interval-secs must be >= 1, got {}",
            config.interval_secs
        )));
    }

    if config.timeout_secs < config.interval_secs {
        return Err(ConfigError::Validation(format!(
            "polling timeout-secs ({}) must be >= interval-secs ({})",
            config.timeout_secs, config.interval_secs
        )));
    }

    Ok(())
}

fn validate_media_config(config: &MediaConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "media max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "media timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if let Some(host) = config.cdn_fallback_hosts.iter().find(|h| h.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "cdn-fallback-hosts contains an empty entry: '{}'",
            host
        )));
    }

    Ok(())
}
