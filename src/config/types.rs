use serde::Deserialize;

/// Default Apify API root
pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2";

/// Default actor: apify/instagram-scraper
pub const DEFAULT_ACTOR_ID: &str = "apify~instagram-scraper";

/// Main settings structure
///
/// Every section is optional in the TOML file; missing sections take their
/// defaults. The API token never comes from the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub media: MediaConfig,

    /// Apify API token, read from `APIFY_API_TOKEN`
    #[serde(skip)]
    pub api_token: String,
}

/// Apify endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API root, e.g. `https://api.apify.com/v2`
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Actor to invoke (`username~actor-name` or actor id)
    #[serde(rename = "actor-id", default = "default_actor_id")]
    pub actor_id: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            actor_id: default_actor_id(),
        }
    }
}

/// Dataset polling behavior
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Seconds slept between poll attempts
    #[serde(rename = "interval-secs", default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Wall-clock ceiling for the whole poll loop, in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the JSON export is written to
    #[serde(rename = "export-dir", default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
        }
    }
}

/// Media download configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_media_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per URL, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base; attempt n waits `factor * 2^(n-1)`
    #[serde(rename = "backoff-factor-ms", default = "default_backoff_factor_ms")]
    pub backoff_factor_ms: u64,

    /// Hosts tried in order when the media host fails DNS resolution
    #[serde(rename = "cdn-fallback-hosts", default = "default_cdn_fallback_hosts")]
    pub cdn_fallback_hosts: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_media_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_factor_ms: default_backoff_factor_ms(),
            cdn_fallback_hosts: default_cdn_fallback_hosts(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_actor_id() -> String {
    DEFAULT_ACTOR_ID.to_string()
}

fn default_interval_secs() -> u64 {
    5
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_export_dir() -> String {
    ".".to_string()
}

fn default_media_timeout_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_factor_ms() -> u64 {
    500
}

fn default_cdn_fallback_hosts() -> Vec<String> {
    [
        "scontent-iad3-1.cdninstagram.com",
        "scontent-iad3-2.cdninstagram.com",
        "scontent-lga3-1.cdninstagram.com",
        "scontent-lga3-2.cdninstagram.com",
        "scontent-dfw5-1.cdninstagram.com",
        "scontent-dfw5-2.cdninstagram.com",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}
