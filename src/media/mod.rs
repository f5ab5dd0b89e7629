//! Media download for scraped posts
//!
//! Images are fetched one at a time. A failing image never aborts the
//! download; it is reported as a [`MediaOutcome::Link`] so the report can
//! fall back to the original URL.

mod fetcher;

pub use fetcher::{cdn_alternates, MediaFetcher};

use crate::model::Post;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while fetching a single media file
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for media operations
pub type MediaResult<T> = std::result::Result<T, MediaError>;

/// What happened to one media URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaOutcome {
    /// Downloaded and written to `path`
    Saved {
        short_code: String,
        url: String,
        path: PathBuf,
    },

    /// Download failed; only the original URL is available
    Link {
        short_code: String,
        url: String,
        error: String,
    },
}

impl MediaOutcome {
    pub fn short_code(&self) -> &str {
        match self {
            MediaOutcome::Saved { short_code, .. } | MediaOutcome::Link { short_code, .. } => {
                short_code
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            MediaOutcome::Saved { url, .. } | MediaOutcome::Link { url, .. } => url,
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, MediaOutcome::Saved { .. })
    }
}

/// Downloads every image of every post into `dir`
///
/// Files are named `<shortCode>_<n>.<ext>`, numbered from 1 per post.
///
/// # Arguments
///
/// * `fetcher` - The configured media fetcher
/// * `posts` - Posts whose display URL and images are downloaded
/// * `dir` - Target directory, created if missing
///
/// # Returns
///
/// * `Ok(Vec<MediaOutcome>)` - One outcome per media URL, in post order
/// * `Err(MediaError)` - The target directory could not be created
pub async fn download_post_media(
    fetcher: &MediaFetcher,
    posts: &[Post],
    dir: &Path,
) -> MediaResult<Vec<MediaOutcome>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut outcomes = Vec::new();
    for post in posts {
        for (idx, url) in post.media_urls().into_iter().enumerate() {
            let path = dir.join(media_file_name(&post.short_code, idx + 1, url));
            let outcome = match save_media(fetcher, url, &path).await {
                Ok(()) => {
                    tracing::debug!("Saved {} to {}", url, path.display());
                    MediaOutcome::Saved {
                        short_code: post.short_code.clone(),
                        url: url.to_string(),
                        path,
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to download media for {}: {}", post.short_code, e);
                    MediaOutcome::Link {
                        short_code: post.short_code.clone(),
                        url: url.to_string(),
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }
    }

    let saved = outcomes.iter().filter(|o| o.is_saved()).count();
    tracing::info!("Downloaded {}/{} media files", saved, outcomes.len());
    Ok(outcomes)
}

async fn save_media(fetcher: &MediaFetcher, url: &str, path: &Path) -> MediaResult<()> {
    let bytes = fetcher.fetch(url).await?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Builds a file name from the short code, position and URL extension
///
/// Characters outside `[A-Za-z0-9_-]` are replaced so the name never leaves
/// the target directory.
fn media_file_name(short_code: &str, position: usize, url: &str) -> String {
    let stem: String = short_code
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "post".to_string() } else { stem };
    format!("{}_{}.{}", stem, position, media_extension(url))
}

fn media_extension(url: &str) -> &'static str {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_default();

    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("png") => "png",
        Some("webp") => "webp",
        Some("heic") => "heic",
        Some("mp4") => "mp4",
        _ => "jpg",
    }
}
