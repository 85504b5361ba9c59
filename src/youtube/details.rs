//! Single-shot lookup of video statistics.

use super::YouTubeClient;
use super::types::{VideoDetails, VideoListResponse};
use crate::error::Result;

impl YouTubeClient {
    /// Fetch title and statistics for one video
    ///
    /// Returns `Ok(None)` when the identifier does not resolve. Only the first
    /// returned item is used.
    pub async fn fetch_video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        let query = [
            ("part", "snippet,statistics".to_string()),
            ("id", video_id.to_string()),
        ];

        let response: VideoListResponse = self
            .execute("videos", &query)
            .await
            .inspect_err(|e| {
                tracing::error!(video_id, error = %e, "Error fetching video details");
            })?;

        match response.items.into_iter().next() {
            Some(video) => Ok(Some(VideoDetails::from_partial(video))),
            None => {
                tracing::warn!(video_id, "No details found for video");
                Ok(None)
            }
        }
    }
}
