//! Normalization of raw dataset items into typed posts
//!
//! This module handles:
//! - Resolving each post field from an ordered list of candidate keys
//! - Deriving short codes and canonical URLs
//! - Parsing timestamps, with an injected clock for missing ones
//! - Mapping nested comments
//! - Rejecting items without a URL or short code
//!
//! Errors never leave [`Normalizer::normalize`]: a failing item is logged and
//! skipped so the rest of the batch survives.

mod clock;
mod comments;
pub mod fields;
mod shortcode;

pub use clock::{Clock, FixedClock, SystemClock};
pub use comments::convert_comments;
pub use shortcode::{canonical_post_url, is_short_code, short_code_from_url};

use crate::model::Post;
use chrono::{DateTime, NaiveDateTime, Utc};
use fields::RawItem;
use serde_json::Value;
use thiserror::Error;

/// Errors that make a single item unconvertible
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Item is not a JSON object")]
    NotAnObject,

    #[error("Field '{key}' has the wrong type, expected {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },

    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),

    #[error("Missing critical fields - URL: '{url}', shortCode: '{short_code}'")]
    MissingIdentity { url: String, short_code: String },
}

/// Converts raw dataset items into [`Post`] records
#[derive(Debug, Clone, Default)]
pub struct Normalizer<C: Clock = SystemClock> {
    clock: C,
}

impl Normalizer<SystemClock> {
    /// Creates a normalizer backed by the system clock
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Normalizer<C> {
    /// Creates a normalizer with a specific time source
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Converts one raw item, or returns `None` if it cannot be converted
    ///
    /// Never fails: conversion errors are logged and yield `None`.
    pub fn normalize(&self, item: &Value) -> Option<Post> {
        match self.try_normalize(item) {
            Ok(post) => {
                tracing::debug!("Successfully converted post with shortCode: {}", post.short_code);
                Some(post)
            }
            Err(NormalizeError::MissingIdentity { url, short_code }) => {
                tracing::warn!(
                    "Created post missing critical fields - URL: '{}', shortCode: '{}'",
                    url,
                    short_code
                );
                None
            }
            Err(e) => {
                tracing::error!("Error converting item to model: {}", e);
                tracing::debug!("Problematic item: {}", item);
                None
            }
        }
    }

    /// Converts one raw item, reporting why it could not be converted
    pub fn try_normalize(&self, item: &Value) -> Result<Post, NormalizeError> {
        let item = item.as_object().ok_or(NormalizeError::NotAnObject)?;
        let post = self.convert(item)?;

        if !post.is_valid() {
            return Err(NormalizeError::MissingIdentity {
                url: post.url,
                short_code: post.short_code,
            });
        }
        Ok(post)
    }

    /// Converts a batch, keeping only the items that convert
    pub fn normalize_batch(&self, items: &[Value]) -> Vec<Post> {
        let total = items.len();
        let mut posts = Vec::with_capacity(total);

        for (idx, item) in items.iter().enumerate() {
            tracing::debug!("Processing item {}/{}", idx + 1, total);
            match self.normalize(item) {
                Some(post) => posts.push(post),
                None => tracing::warn!("Skipped item {} - conversion returned no post", idx + 1),
            }
        }

        tracing::info!("Normalized {} posts out of {} items", posts.len(), total);
        posts
    }

    fn convert(&self, item: &RawItem) -> Result<Post, NormalizeError> {
        let raw_url = fields::string_or_empty(item, fields::URL)?;

        let short_code = match fields::string(item, fields::SHORT_CODE)? {
            Some(code) if is_short_code(&code) => code,
            other => {
                if let Some(code) = other.filter(|c| !c.is_empty()) {
                    tracing::warn!("Ignoring malformed shortCode: '{}'", code);
                }
                let derived = short_code_from_url(&raw_url).unwrap_or_default();
                tracing::debug!("Extracted shortCode from URL: '{}'", derived);
                derived
            }
        };

        let url = if short_code.is_empty() {
            raw_url
        } else {
            canonical_post_url(&short_code)
        };

        let display_url = fields::string_or_empty(item, fields::DISPLAY_URL)?;
        let images = match fields::string_list(item, fields::IMAGES)? {
            Some(images) => images,
            None if !display_url.is_empty() => vec![display_url.clone()],
            None => Vec::new(),
        };

        let timestamp = match fields::string(item, fields::TIMESTAMP)? {
            Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)?,
            _ => {
                tracing::warn!("No timestamp found, using current time");
                self.clock.now()
            }
        };

        let post_id = fields::string_or_empty(item, fields::POST_ID)?;
        let latest_comments =
            convert_comments(fields::value_list(item, fields::LATEST_COMMENTS)?, &post_id);

        Ok(Post {
            input_url: fields::string_or_empty(item, fields::INPUT_URL)?,
            url,
            post_type: fields::string(item, fields::TYPE)?.unwrap_or_else(|| "Image".to_string()),
            short_code,
            caption: Some(fields::string_or_empty(item, fields::CAPTION)?),
            hashtags: fields::string_list(item, fields::HASHTAGS)?.unwrap_or_default(),
            mentions: fields::string_list(item, fields::MENTIONS)?.unwrap_or_default(),
            comments_count: fields::integer(item, fields::COMMENTS_COUNT)?,
            first_comment: Some(fields::string_or_empty(item, fields::FIRST_COMMENT)?),
            latest_comments,
            dimensions_height: fields::integer(item, fields::HEIGHT)?,
            dimensions_width: fields::integer(item, fields::WIDTH)?,
            display_url,
            images,
            alt: Some(fields::string_or_empty(item, fields::ALT)?),
            likes_count: fields::integer(item, fields::LIKES_COUNT)?,
            timestamp,
            child_posts: fields::value_list(item, fields::CHILD_POSTS)?.to_vec(),
            owner_full_name: fields::string_or_empty(item, fields::OWNER_FULL_NAME)?,
            owner_username: fields::string_or_empty(item, fields::OWNER_USERNAME)?,
            owner_id: fields::string_or_empty(item, fields::OWNER_ID)?,
            is_sponsored: fields::boolean(item, fields::IS_SPONSORED)?,
        })
    }
}

/// Parses an ISO-8601 timestamp
///
/// A trailing `Z` is read as `+00:00`; a timestamp without any offset is
/// taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => trimmed.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| NormalizeError::InvalidTimestamp(raw.to_string()))
}
