//! Normalized post and comment records
//!
//! These are only ever produced by the normalizer and are not mutated after
//! construction. Serialization uses the camelCase field names of the Apify
//! dataset so exported JSON stays recognizable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a comment
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentOwner {
    pub id: String,
    pub username: String,
    pub is_verified: bool,
    pub profile_pic_url: String,
}

/// One comment from a post's `latestComments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Id of the post this comment belongs to
    pub post_id: String,
    pub text: String,
    /// Zero-based position within the source list
    pub position: usize,
    /// Timestamp exactly as the source reported it
    pub timestamp: String,
    pub owner: CommentOwner,
}

/// A normalized Instagram post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub input_url: String,
    /// Canonical `https://www.instagram.com/p/<shortCode>/` URL
    pub url: String,
    /// Free-form media type, e.g. "Image", "Video", "Sidecar"
    #[serde(rename = "type")]
    pub post_type: String,
    pub short_code: String,
    pub caption: Option<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub comments_count: i64,
    pub first_comment: Option<String>,
    pub latest_comments: Vec<Comment>,
    pub dimensions_height: i64,
    pub dimensions_width: i64,
    pub display_url: String,
    pub images: Vec<String>,
    pub alt: Option<String>,
    pub likes_count: i64,
    pub timestamp: DateTime<Utc>,
    /// Carousel children, kept untyped
    pub child_posts: Vec<Value>,
    pub owner_full_name: String,
    pub owner_username: String,
    pub owner_id: String,
    pub is_sponsored: bool,
}

impl Post {
    /// Returns true if the post carries both identity fields
    pub fn is_valid(&self) -> bool {
        !self.url.is_empty() && !self.short_code.is_empty()
    }

    /// Display URL followed by additional images, without duplicates
    pub fn media_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = Vec::new();
        for url in std::iter::once(&self.display_url).chain(&self.images) {
            if !url.is_empty() && !urls.contains(&url.as_str()) {
                urls.push(url.as_str());
            }
        }
        urls
    }
}
