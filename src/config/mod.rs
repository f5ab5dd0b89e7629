//! Configuration module for insta-scraper
//!
//! This module handles loading and validating the optional TOML settings
//! file, reading the API token from the environment, and validating the
//! profile URLs a user asks to scrape.
//!
//! # Example
//!
//! ```no_run
//! use insta_scraper::config::load_settings;
//! use std::path::Path;
//!
//! let settings = load_settings(Some(Path::new("settings.toml"))).unwrap();
//! println!("Actor: {}", settings.api.actor_id);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, MediaConfig, OutputConfig, PollingConfig, Settings, DEFAULT_ACTOR_ID,
    DEFAULT_BASE_URL,
};

// Re-export parser and validation functions
pub use parser::{api_token_from_env, load_settings, parse_settings, API_TOKEN_VAR};
pub use validation::is_valid_profile_url;
