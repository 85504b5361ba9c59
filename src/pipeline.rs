//! Per-video orchestration: fetch, persist locally, upload, optionally analyze.

use crate::analysis::{OpenAiClient, SeoAnalyzer, TextCompletion};
use crate::error::Result;
use crate::export::{OutputFormat, report_file_name, write_artifact};
use crate::storage::{ObjectStore, ObjectStoreWriter, UploadOutcome};
use crate::utils::sanitize_video_id;
use crate::youtube::{CommentRecord, VideoDetails, YouTubeClient};
use std::path::PathBuf;
use tracing::{info, warn};

/// Options applied to every video of a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory artifacts and reports are written to
    pub output_dir: PathBuf,
    /// Artifact format
    pub format: OutputFormat,
    /// Stop paginating once at least this many comments are held
    pub max_comments: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: OutputFormat::Csv,
            max_comments: None,
        }
    }
}

/// What happened to one video
#[derive(Debug, Clone)]
pub struct VideoRun {
    /// Sanitized video identifier
    pub video_id: String,
    /// Aggregate statistics, `None` if the video did not resolve
    pub details: Option<VideoDetails>,
    /// Collected comments in pagination order
    pub comments: Vec<CommentRecord>,
    /// Local artifact path
    pub artifact: PathBuf,
    /// Upload result for the artifact
    pub upload: UploadOutcome,
    /// Local SEO report, when analysis is enabled
    pub report: Option<PathBuf>,
}

/// Sequential ETL over one or more videos
pub struct Pipeline<S, C = OpenAiClient> {
    youtube: YouTubeClient,
    writer: ObjectStoreWriter<S>,
    options: RunOptions,
    analyzer: Option<SeoAnalyzer<C>>,
}

impl<S: ObjectStore> Pipeline<S> {
    /// Create a pipeline without comment analysis
    pub fn new(youtube: YouTubeClient, writer: ObjectStoreWriter<S>, options: RunOptions) -> Self {
        Self {
            youtube,
            writer,
            options,
            analyzer: None,
        }
    }
}

impl<S: ObjectStore, C: TextCompletion> Pipeline<S, C> {
    /// Enable the SEO report for every processed video
    pub fn with_analyzer<C2: TextCompletion>(self, analyzer: SeoAnalyzer<C2>) -> Pipeline<S, C2> {
        Pipeline {
            youtube: self.youtube,
            writer: self.writer,
            options: self.options,
            analyzer: Some(analyzer),
        }
    }

    /// The object store writer
    pub fn writer(&self) -> &ObjectStoreWriter<S> {
        &self.writer
    }

    /// Process videos in order, stopping at the first failure
    ///
    /// The returned error names the video that failed.
    pub async fn run<I, T>(&mut self, video_ids: I) -> Result<Vec<VideoRun>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut runs = Vec::new();
        for video_id in video_ids {
            runs.push(self.process_video(video_id.as_ref()).await?);
        }
        info!(videos = runs.len(), "Pipeline run complete");
        Ok(runs)
    }

    /// Fetch, persist, upload and optionally analyze a single video
    pub async fn process_video(&mut self, video_id: &str) -> Result<VideoRun> {
        let run = match sanitize_video_id(video_id) {
            Ok(id) => self.process_sanitized(&id).await.map_err(|e| e.for_video(&id)),
            Err(e) => Err(e.for_video(video_id)),
        };
        if let Err(e) = &run {
            tracing::error!(video_id, error = %e, "Video processing failed");
        }
        run
    }

    async fn process_sanitized(&mut self, video_id: &str) -> Result<VideoRun> {
        info!(video_id, "Processing video");

        let details = self.youtube.fetch_video_details(video_id).await?;
        match &details {
            Some(d) => info!(
                video_id,
                title = %d.title,
                views = d.views,
                comments = d.comments,
                "Fetched video details"
            ),
            None => warn!(video_id, "Video details unavailable"),
        }

        let comments = self
            .youtube
            .fetch_comments(video_id, self.options.max_comments)
            .await?;
        info!(video_id, count = comments.len(), "Fetched comments");

        let artifact = write_artifact(
            &self.options.output_dir,
            video_id,
            &comments,
            self.options.format,
        )
        .await?;
        let upload = self.writer.upload_file(&artifact, None).await?;

        let report = match self.analyzer.as_mut() {
            Some(analyzer) => {
                let text = comments
                    .iter()
                    .map(|c| c.text_display.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let report = analyzer.comprehensive_analysis(&text).await?;
                let path = self.options.output_dir.join(report_file_name(video_id));
                tokio::fs::write(&path, report.to_markdown()).await?;
                info!(video_id, path = %path.display(), "Wrote SEO report");
                Some(path)
            }
            None => None,
        };

        Ok(VideoRun {
            video_id: video_id.to_string(),
            details,
            comments,
            artifact,
            upload,
            report,
        })
    }
}
