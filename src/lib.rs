//! insta-scraper: Instagram post retrieval through the Apify actor API
//!
//! This crate submits a scrape run to Apify, polls the run's dataset until it
//! is populated, and normalizes the heterogeneous dataset items into typed
//! [`Post`] records that can be summarized, reported and exported.

pub mod apify;
pub mod config;
pub mod media;
pub mod model;
pub mod normalize;
pub mod output;
pub mod scraper;

use thiserror::Error;

/// Main error type for scrape operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to start actor run: {0}")]
    Submission(String),

    #[error("Actor run {run_id} failed: {message}")]
    RunFailed { run_id: String, message: String },

    #[error("Dataset retrieval timed out after {elapsed_secs}s")]
    Timeout { elapsed_secs: u64 },

    #[error("Failed to retrieve dataset after {elapsed_secs}s: {source}")]
    PollFailed {
        elapsed_secs: u64,
        source: Box<ScrapeError>,
    },

    #[error("Apify API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in settings: {0}")]
    InvalidUrl(String),
}

/// Errors raised while building a scrape request from user input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("At least one Instagram URL is required")]
    NoUrls,

    #[error("Invalid Instagram URLs: {}", .0.join(", "))]
    InvalidProfileUrls(Vec<String>),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Result type alias for scrape operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

// Re-export commonly used types
pub use apify::{ActorBackend, ApifyClient};
pub use config::Settings;
pub use model::{Comment, CommentOwner, Post, ResultsType, ScrapeRequest, SearchType};
pub use normalize::{Clock, Normalizer, SystemClock};
pub use scraper::Scraper;
