//! Ordered key lookup for raw dataset items
//!
//! Each target field names the raw keys it may come from, in priority order.
//! The first key that is present and not `null` wins; a present value of the
//! wrong JSON type is an error rather than a silent fallback.

use crate::normalize::NormalizeError;
use serde_json::{Map, Value};

/// Raw item as returned by the dataset
pub type RawItem = Map<String, Value>;

// Candidate keys per target field, highest priority first.
pub const INPUT_URL: &[&str] = &["url", "inputUrl"];
pub const URL: &[&str] = &["url"];
pub const TYPE: &[&str] = &["type", "mediaType"];
pub const SHORT_CODE: &[&str] = &["shortCode"];
pub const CAPTION: &[&str] = &["caption", "text"];
pub const HASHTAGS: &[&str] = &["hashtags"];
pub const MENTIONS: &[&str] = &["mentions"];
pub const COMMENTS_COUNT: &[&str] = &["commentsCount"];
pub const FIRST_COMMENT: &[&str] = &["firstComment"];
pub const LATEST_COMMENTS: &[&str] = &["latestComments"];
pub const HEIGHT: &[&str] = &["dimensionsHeight", "height"];
pub const WIDTH: &[&str] = &["dimensionsWidth", "width"];
pub const DISPLAY_URL: &[&str] = &["displayUrl", "imageUrl"];
pub const IMAGES: &[&str] = &["images"];
pub const ALT: &[&str] = &["alt", "accessibility_caption"];
pub const LIKES_COUNT: &[&str] = &["likesCount"];
pub const TIMESTAMP: &[&str] = &["timestamp"];
pub const CHILD_POSTS: &[&str] = &["childPosts"];
pub const OWNER_FULL_NAME: &[&str] = &["ownerFullName", "fullName"];
pub const OWNER_USERNAME: &[&str] = &["ownerUsername", "username"];
pub const OWNER_ID: &[&str] = &["ownerId", "userId"];
pub const IS_SPONSORED: &[&str] = &["isSponsored"];
pub const POST_ID: &[&str] = &["id"];

/// Returns the first candidate key present with a non-null value
pub fn first_present<'a>(item: &'a RawItem, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|&key| item.get(key).filter(|v| !v.is_null()).map(|v| (key, v)))
}

fn wrong_type(key: &'static str, expected: &'static str) -> NormalizeError {
    NormalizeError::WrongType { key, expected }
}

/// Resolves a string; numbers are accepted and rendered as text
pub fn string(item: &RawItem, keys: &[&'static str]) -> Result<Option<String>, NormalizeError> {
    match first_present(item, keys) {
        None => Ok(None),
        Some((_, Value::String(s))) => Ok(Some(s.clone())),
        Some((_, Value::Number(n))) => Ok(Some(n.to_string())),
        Some((key, _)) => Err(wrong_type(key, "string")),
    }
}

/// Resolves a string, defaulting to empty
pub fn string_or_empty(item: &RawItem, keys: &[&'static str]) -> Result<String, NormalizeError> {
    Ok(string(item, keys)?.unwrap_or_default())
}

/// Resolves an integer, defaulting to zero
pub fn integer(item: &RawItem, keys: &[&'static str]) -> Result<i64, NormalizeError> {
    match first_present(item, keys) {
        None => Ok(0),
        Some((key, value)) => value.as_i64().ok_or_else(|| wrong_type(key, "integer")),
    }
}

/// Resolves a boolean, defaulting to false
pub fn boolean(item: &RawItem, keys: &[&'static str]) -> Result<bool, NormalizeError> {
    match first_present(item, keys) {
        None => Ok(false),
        Some((key, value)) => value.as_bool().ok_or_else(|| wrong_type(key, "boolean")),
    }
}

/// Resolves a list of strings; `None` when no key is present
pub fn string_list(
    item: &RawItem,
    keys: &[&'static str],
) -> Result<Option<Vec<String>>, NormalizeError> {
    match first_present(item, keys) {
        None => Ok(None),
        Some((key, Value::Array(values))) => values
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| wrong_type(key, "list of strings"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some((key, _)) => Err(wrong_type(key, "list of strings")),
    }
}

/// Resolves a list of arbitrary JSON values, defaulting to empty
pub fn value_list<'a>(
    item: &'a RawItem,
    keys: &[&'static str],
) -> Result<&'a [Value], NormalizeError> {
    match first_present(item, keys) {
        None => Ok(&[]),
        Some((_, Value::Array(values))) => Ok(values.as_slice()),
        Some((key, _)) => Err(wrong_type(key, "list")),
    }
}
