//! Comment sub-mapping
//!
//! Comments are lenient: any missing or oddly typed field becomes an empty
//! string or `false`, so one malformed comment never costs the whole post.

use crate::model::{Comment, CommentOwner};
use serde_json::Value;

/// Converts a post's raw `latestComments` entries
///
/// # Arguments
///
/// * `raw_comments` - Entries of the raw list, in source order
/// * `post_id` - The outer item's `id`
pub fn convert_comments(raw_comments: &[Value], post_id: &str) -> Vec<Comment> {
    raw_comments
        .iter()
        .enumerate()
        .map(|(position, raw)| convert_comment(raw, post_id, position))
        .collect()
}

fn convert_comment(raw: &Value, post_id: &str, position: usize) -> Comment {
    let owner = raw.get("owner").unwrap_or(&Value::Null);

    Comment {
        id: text(raw, "id"),
        post_id: post_id.to_string(),
        text: text(raw, "text"),
        position,
        timestamp: text(raw, "timestamp"),
        owner: CommentOwner {
            id: text(owner, "id"),
            username: text(owner, "username"),
            is_verified: owner
                .get("is_verified")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            profile_pic_url: text(owner, "profile_pic_url"),
        },
    }
}

fn text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
