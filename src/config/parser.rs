use crate::config::types::Settings;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable holding the Apify API token
pub const API_TOKEN_VAR: &str = "APIFY_API_TOKEN";

/// Loads settings from an optional TOML file and the environment
///
/// Without a path, every section takes its defaults. The API token is always
/// read from `APIFY_API_TOKEN`; its absence is fatal.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML settings file
///
/// # Returns
///
/// * `Ok(Settings)` - Loaded and validated settings, token included
/// * `Err(ConfigError)` - Failed to read, parse, or validate, or no token
///
/// # Example
///
/// ```no_run
/// use insta_scraper::config::load_settings;
///
/// let settings = load_settings(None).unwrap();
/// println!("Polling every {}s", settings.polling.interval_secs);
/// ```
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = match path {
        Some(path) => parse_settings(&std::fs::read_to_string(path)?)?,
        None => Settings::default(),
    };

    validate(&settings)?;

    settings.api_token = api_token_from_env()?;
    Ok(settings)
}

/// Parses settings from TOML text without touching the environment
pub fn parse_settings(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = toml::from_str(content)?;
    Ok(settings)
}

/// Reads the API token, treating an empty value as missing
pub fn api_token_from_env() -> Result<String, ConfigError> {
    std::env::var(API_TOKEN_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(API_TOKEN_VAR.to_string()))
}
