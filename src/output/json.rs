//! JSON export of normalized posts

use crate::model::Post;
use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name for an export created at `at`
///
/// Format: `instagram_data_YYYYMMDD_HHMMSS.json`
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("instagram_data_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Serializes posts as a pretty-printed JSON array
pub fn posts_to_json(posts: &[Post]) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(posts)?)
}

/// Writes posts to a timestamped JSON file in `dir`
///
/// # Arguments
///
/// * `posts` - The posts to export
/// * `dir` - Target directory, created if missing
/// * `at` - Timestamp used in the file name
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - Failed to serialize or write
pub fn export_json(posts: &[Post], dir: &Path, at: DateTime<Utc>) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(at));

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, posts)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!("Exported {} posts to {}", posts.len(), path.display());
    Ok(path)
}
