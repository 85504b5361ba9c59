//! Local comment artifacts (CSV or JSON records)

use crate::error::{Error, Result};
use crate::youtube::CommentRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Serialization format of the local artifact
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    #[default]
    Csv,
    /// JSON array of record objects
    Json,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// `<video_id>_YouTube_Comments.<ext>`
pub fn artifact_file_name(video_id: &str, format: OutputFormat) -> String {
    format!("{video_id}_YouTube_Comments.{}", format.extension())
}

/// `<video_id>_SEO_Report.md`
pub fn report_file_name(video_id: &str) -> String {
    format!("{video_id}_SEO_Report.md")
}

/// Write `comments` to `dir/<artifact name>` and return the path
pub async fn write_artifact(
    dir: &Path,
    video_id: &str,
    comments: &[CommentRecord],
    format: OutputFormat,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(artifact_file_name(video_id, format));
    write_comments(&path, comments, format).await?;
    tracing::info!(path = %path.display(), records = comments.len(), "Wrote comment artifact");
    Ok(path)
}

/// Serialize `comments` to `path`, replacing any existing file
pub async fn write_comments(
    path: &Path,
    comments: &[CommentRecord],
    format: OutputFormat,
) -> Result<()> {
    let bytes = encode_comments(comments, format)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Serialize `comments` into an in-memory buffer
///
/// The CSV header is written even when there are no records.
pub fn encode_comments(comments: &[CommentRecord], format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(Vec::new());
            writer.write_record(CSV_HEADER)?;
            for record in comments {
                writer.serialize(record)?;
            }
            writer.into_inner().map_err(|e| Error::Io(e.into_error()))
        }
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(comments)?),
    }
}

const CSV_HEADER: [&str; 5] = [
    "channelId",
    "textDisplay",
    "likeCount",
    "publishedAt",
    "updatedAt",
];
