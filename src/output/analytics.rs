//! Aggregate analytics over a batch of posts
//!
//! Averages use integer division, and an empty batch yields zeros.

use crate::model::Post;
use std::collections::HashMap;

/// Caption previews are cut to this many characters
const CAPTION_PREVIEW_CHARS: usize = 100;

/// One row of the engagement table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementRow {
    /// `YYYY-MM-DD HH:MM`
    pub date: String,
    pub likes: i64,
    pub comments: i64,
    pub url: String,
    pub caption_preview: String,
}

/// Usage statistics for one hashtag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagStats {
    pub tag: String,
    pub count: u64,
    pub avg_likes: i64,
    pub avg_comments: i64,
}

/// Analytics summary for a scrape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostAnalytics {
    pub total_posts: u64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub avg_likes: i64,
    pub avg_comments: i64,
    pub engagement: Vec<EngagementRow>,
    /// Sorted by usage count, most used first
    pub hashtags: Vec<HashtagStats>,
}

impl PostAnalytics {
    /// Computes analytics for a batch of posts
    pub fn from_posts(posts: &[Post]) -> Self {
        let total_posts = posts.len() as u64;
        let total_likes: i64 = posts.iter().map(|p| p.likes_count).sum();
        let total_comments: i64 = posts.iter().map(|p| p.comments_count).sum();

        Self {
            total_posts,
            total_likes,
            total_comments,
            avg_likes: average(total_likes, total_posts),
            avg_comments: average(total_comments, total_posts),
            engagement: posts.iter().map(engagement_row).collect(),
            hashtags: hashtag_stats(posts),
        }
    }
}

fn average(total: i64, count: u64) -> i64 {
    if count == 0 {
        0
    } else {
        total.div_euclid(count as i64)
    }
}

fn engagement_row(post: &Post) -> EngagementRow {
    EngagementRow {
        date: post.timestamp.format("%Y-%m-%d %H:%M").to_string(),
        likes: post.likes_count,
        comments: post.comments_count,
        url: crate::normalize::canonical_post_url(&post.short_code),
        caption_preview: caption_preview(post.caption.as_deref().unwrap_or("")),
    }
}

/// Cuts a caption to the preview length and appends an ellipsis
///
/// Empty captions stay empty.
pub fn caption_preview(caption: &str) -> String {
    if caption.is_empty() {
        return String::new();
    }
    let preview: String = caption.chars().take(CAPTION_PREVIEW_CHARS).collect();
    format!("{}...", preview)
}

#[derive(Default)]
struct TagTotals {
    count: u64,
    likes: i64,
    comments: i64,
}

fn hashtag_stats(posts: &[Post]) -> Vec<HashtagStats> {
    // Insertion order is kept so ties sort by first appearance
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, TagTotals> = HashMap::new();

    for post in posts {
        for tag in &post.hashtags {
            let entry = totals.entry(tag.clone()).or_insert_with(|| {
                order.push(tag.clone());
                TagTotals::default()
            });
            entry.count += 1;
            entry.likes += post.likes_count;
            entry.comments += post.comments_count;
        }
    }

    let mut stats: Vec<HashtagStats> = order
        .into_iter()
        .filter_map(|tag| {
            let t = totals.remove(&tag)?;
            Some(HashtagStats {
                avg_likes: average(t.likes, t.count),
                avg_comments: average(t.comments, t.count),
                count: t.count,
                tag,
            })
        })
        .collect();

    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

/// Prints analytics to stdout in a formatted manner
pub fn print_analytics(analytics: &PostAnalytics) {
    println!("=== Analytics Overview ===\n");

    println!("  Total posts: {}", analytics.total_posts);
    println!("  Total likes: {}", analytics.total_likes);
    println!("  Avg. likes/post: {}", analytics.avg_likes);
    println!("  Avg. comments/post: {}", analytics.avg_comments);
    println!();

    if !analytics.engagement.is_empty() {
        println!("Post Engagement:");
        for row in &analytics.engagement {
            println!(
                "  {}  {:>8} likes  {:>6} comments  {}",
                row.date, row.likes, row.comments, row.url
            );
        }
        println!();
    }

    if !analytics.hashtags.is_empty() {
        println!("Top Hashtags:");
        for stat in analytics.hashtags.iter().take(20) {
            println!(
                "  #{} - used {} time(s), avg. {} likes, avg. {} comments",
                stat.tag, stat.count, stat.avg_likes, stat.avg_comments
            );
        }
        println!();
    }
}
