//! Output module for scrape results
//!
//! This module handles:
//! - Computing engagement and hashtag analytics
//! - Exporting normalized posts as JSON
//! - Generating markdown reports

mod analytics;
mod json;
mod markdown;

pub use analytics::{
    caption_preview, print_analytics, EngagementRow, HashtagStats, PostAnalytics,
};
pub use json::{export_file_name, export_json, posts_to_json};
pub use markdown::{format_markdown_report, write_markdown_report};

use thiserror::Error;

/// Errors raised while writing output files
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for output operations
pub type OutputResult<T> = std::result::Result<T, OutputError>;
