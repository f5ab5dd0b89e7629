//! Markdown report generation
//!
//! Renders the analytics tables and one card per post. When media was
//! downloaded, saved files are embedded and failed downloads fall back to a
//! plain link to the original URL.

use crate::media::MediaOutcome;
use crate::model::Post;
use crate::output::analytics::{caption_preview, PostAnalytics};
use crate::output::OutputResult;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown report to `output_path`
pub fn write_markdown_report(
    posts: &[Post],
    analytics: &PostAnalytics,
    media: &[MediaOutcome],
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(posts, analytics, media);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats posts and analytics as markdown
pub fn format_markdown_report(
    posts: &[Post],
    analytics: &PostAnalytics,
    media: &[MediaOutcome],
) -> String {
    let mut md = String::new();

    md.push_str("# Instagram Scrape Report\n\n");

    // Overview
    md.push_str("## Analytics Overview\n\n");
    md.push_str(&format!("- **Total Posts**: {}\n", analytics.total_posts));
    md.push_str(&format!("- **Total Likes**: {}\n", analytics.total_likes));
    md.push_str(&format!("- **Avg. Likes/Post**: {}\n", analytics.avg_likes));
    md.push_str(&format!(
        "- **Avg. Comments/Post**: {}\n\n",
        analytics.avg_comments
    ));

    // Engagement
    if !analytics.engagement.is_empty() {
        md.push_str("## Post Engagement\n\n");
        md.push_str("| Posted | Likes | Comments | Link | Caption |\n");
        md.push_str("|--------|-------|----------|------|---------|\n");
        for row in &analytics.engagement {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.date,
                row.likes,
                row.comments,
                row.url,
                escape_cell(&row.caption_preview)
            ));
        }
        md.push('\n');
    }

    // Hashtags
    if !analytics.hashtags.is_empty() {
        md.push_str("## Hashtag Analysis\n\n");
        md.push_str("| Hashtag | Usage Count | Avg. Likes | Avg. Comments |\n");
        md.push_str("|---------|-------------|------------|---------------|\n");
        for stat in &analytics.hashtags {
            md.push_str(&format!(
                "| #{} | {} | {} | {} |\n",
                stat.tag, stat.count, stat.avg_likes, stat.avg_comments
            ));
        }
        md.push('\n');
    }

    // Posts
    if !posts.is_empty() {
        let by_url: HashMap<(&str, &str), &MediaOutcome> = media
            .iter()
            .map(|m| ((m.short_code(), m.url()), m))
            .collect();

        md.push_str("## Posts\n\n");
        for post in posts {
            md.push_str(&format_post_card(post, &by_url));
        }
    }

    md
}

fn format_post_card(post: &Post, media: &HashMap<(&str, &str), &MediaOutcome>) -> String {
    let mut md = String::new();

    let owner = if post.owner_full_name.is_empty() {
        format!("@{}", post.owner_username)
    } else {
        format!("{} (@{})", post.owner_full_name, post.owner_username)
    };
    md.push_str(&format!("### {} · {}\n\n", owner, post.short_code));

    md.push_str(&format!("- **Link**: {}\n", post.url));
    md.push_str(&format!("- **Type**: {}\n", post.post_type));
    md.push_str(&format!(
        "- **Posted**: {}\n",
        post.timestamp.format("%B %d, %Y %H:%M")
    ));
    md.push_str(&format!(
        "- **Likes**: {} · **Comments**: {}\n",
        post.likes_count, post.comments_count
    ));
    if post.dimensions_width > 0 && post.dimensions_height > 0 {
        md.push_str(&format!(
            "- **Dimensions**: {}x{}\n",
            post.dimensions_width, post.dimensions_height
        ));
    }
    if post.is_sponsored {
        md.push_str("- **Sponsored**\n");
    }
    if !post.hashtags.is_empty() {
        let tags: Vec<String> = post.hashtags.iter().map(|t| format!("#{}", t)).collect();
        md.push_str(&format!("- **Hashtags**: {}\n", tags.join(" ")));
    }
    if !post.mentions.is_empty() {
        let mentions: Vec<String> = post.mentions.iter().map(|m| format!("@{}", m)).collect();
        md.push_str(&format!("- **Mentions**: {}\n", mentions.join(" ")));
    }
    md.push('\n');

    if let Some(caption) = post.caption.as_deref().filter(|c| !c.is_empty()) {
        for line in caption.lines() {
            md.push_str(&format!("> {}\n", line));
        }
        md.push('\n');
    }

    let urls = post.media_urls();
    if !urls.is_empty() {
        let alt = post.alt.as_deref().filter(|a| !a.is_empty()).unwrap_or("post image");
        for (idx, url) in urls.iter().enumerate() {
            match media.get(&(post.short_code.as_str(), *url)) {
                Some(MediaOutcome::Saved { path, .. }) => {
                    md.push_str(&format!("![{}]({})\n", alt, path.display()));
                }
                _ => {
                    md.push_str(&format!("- [Image {}]({})\n", idx + 1, url));
                }
            }
        }
        md.push('\n');
    }

    if !post.latest_comments.is_empty() {
        md.push_str("**Latest comments**\n\n");
        for comment in &post.latest_comments {
            let badge = if comment.owner.is_verified { " ✓" } else { "" };
            md.push_str(&format!(
                "- **@{}**{}: {}\n",
                comment.owner.username,
                badge,
                caption_preview_line(&comment.text)
            ));
        }
        md.push('\n');
    }

    md
}

/// Single-line rendering of comment text
fn caption_preview_line(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > 100 {
        caption_preview(&flat)
    } else {
        flat
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
