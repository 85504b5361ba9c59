//! Wire types for the YouTube Data API and the normalized records built from them.
//!
//! Wire types keep every optional field as `Option`; the `from_partial`
//! constructors are the single place where sentinels and defaults are filled in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder used for identity and timestamp fields missing from a response
pub const UNKNOWN: &str = "Unknown";

/// One page of `commentThreads.list`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadPage {
    /// Comment threads on this page
    #[serde(default)]
    pub items: Vec<CommentThread>,
    /// Continuation token for the next page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A comment thread resource
#[derive(Debug, Clone, Deserialize)]
pub struct CommentThread {
    /// Thread snippet (required; its absence makes the page malformed)
    pub snippet: CommentThreadSnippet,
}

/// Snippet of a comment thread
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    /// The comment that opened the thread
    pub top_level_comment: TopLevelComment,
}

/// Top-level comment resource
#[derive(Debug, Clone, Deserialize)]
pub struct TopLevelComment {
    /// Comment snippet with the fields we keep
    pub snippet: PartialComment,
}

/// Comment snippet as returned by the API, every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialComment {
    /// Author channel reference
    #[serde(default)]
    pub author_channel_id: Option<AuthorChannelId>,
    /// Comment text
    #[serde(default)]
    pub text_display: Option<String>,
    /// Number of likes
    #[serde(default, deserialize_with = "deserialize_count")]
    pub like_count: Option<u64>,
    /// Publication timestamp (RFC 3339)
    #[serde(default)]
    pub published_at: Option<String>,
    /// Last edit timestamp (RFC 3339)
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// `authorChannelId` object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorChannelId {
    /// Channel identifier
    #[serde(default)]
    pub value: Option<String>,
}

/// Response of `videos.list`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListResponse {
    /// Matching videos
    #[serde(default)]
    pub items: Vec<PartialVideo>,
}

/// Video resource as returned by the API, every part optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartialVideo {
    /// `snippet` part
    #[serde(default)]
    pub snippet: Option<VideoSnippet>,
    /// `statistics` part
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
}

/// `snippet` part of a video
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoSnippet {
    /// Video title
    #[serde(default)]
    pub title: Option<String>,
}

/// `statistics` part of a video; counts arrive as decimal strings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    /// `viewCount`
    #[serde(default, deserialize_with = "deserialize_count")]
    pub view_count: Option<u64>,
    /// `likeCount`
    #[serde(default, deserialize_with = "deserialize_count")]
    pub like_count: Option<u64>,
    /// `dislikeCount` (no longer public for most videos)
    #[serde(default, deserialize_with = "deserialize_count")]
    pub dislike_count: Option<u64>,
    /// `commentCount`
    #[serde(default, deserialize_with = "deserialize_count")]
    pub comment_count: Option<u64>,
}

/// A normalized comment, one row of the exported artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// Author channel ID, or `"Unknown"`
    pub channel_id: String,
    /// Comment text, or empty
    pub text_display: String,
    /// Like count, or 0
    pub like_count: u64,
    /// Publication timestamp, or `"Unknown"`
    pub published_at: String,
    /// Last edit timestamp, or `"Unknown"`
    pub updated_at: String,
}

impl CommentRecord {
    /// Fill defaults for every field the API left out
    pub fn from_partial(partial: PartialComment) -> Self {
        Self {
            channel_id: partial
                .author_channel_id
                .and_then(|a| a.value)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            text_display: partial.text_display.unwrap_or_default(),
            like_count: partial.like_count.unwrap_or(0),
            published_at: partial.published_at.unwrap_or_else(|| UNKNOWN.to_string()),
            updated_at: partial.updated_at.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// Publication time, if present and well-formed
    pub fn published_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published_at)
    }

    /// Last edit time, if present and well-formed
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated_at)
    }
}

/// Aggregate statistics of one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    /// Video title
    pub title: String,
    /// View count
    pub views: u64,
    /// Like count
    pub likes: u64,
    /// Dislike count
    pub dislikes: u64,
    /// Comment count
    pub comments: u64,
}

impl VideoDetails {
    /// Fill defaults (empty title, zero counts) for missing parts
    pub fn from_partial(partial: PartialVideo) -> Self {
        let title = partial.snippet.and_then(|s| s.title).unwrap_or_default();
        let stats = partial.statistics.unwrap_or_default();
        Self {
            title,
            views: stats.view_count.unwrap_or(0),
            likes: stats.like_count.unwrap_or(0),
            dislikes: stats.dislike_count.unwrap_or(0),
            comments: stats.comment_count.unwrap_or(0),
        }
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if value == UNKNOWN {
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Accept counts as JSON numbers or decimal strings
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Count::Number(n)) => Ok(Some(n)),
        Some(Count::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid count {s:?}: {e}"))),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comment_defaults_for_missing_fields() {
        let partial: PartialComment = serde_json::from_value(json!({})).unwrap();
        let record = CommentRecord::from_partial(partial);

        assert_eq!(record.channel_id, "Unknown");
        assert_eq!(record.text_display, "");
        assert_eq!(record.like_count, 0);
        assert_eq!(record.published_at, "Unknown");
        assert_eq!(record.updated_at, "Unknown");
        assert!(record.published_at_utc().is_none());
    }

    #[test]
    fn test_comment_full_snippet() {
        let partial: PartialComment = serde_json::from_value(json!({
            "authorChannelId": {"value": "UC123"},
            "textDisplay": "great video",
            "likeCount": 12,
            "publishedAt": "2024-03-01T10:00:00Z",
            "updatedAt": "2024-03-02T11:30:00Z"
        }))
        .unwrap();
        let record = CommentRecord::from_partial(partial);

        assert_eq!(record.channel_id, "UC123");
        assert_eq!(record.like_count, 12);
        let published = record.published_at_utc().unwrap();
        assert_eq!(published.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert!(record.updated_at_utc().unwrap() > published);
    }

    #[test]
    fn test_author_channel_without_value_is_unknown() {
        let partial: PartialComment =
            serde_json::from_value(json!({"authorChannelId": {}})).unwrap();
        assert_eq!(CommentRecord::from_partial(partial).channel_id, "Unknown");
    }

    #[test]
    fn test_record_serializes_with_api_field_names() {
        let record = CommentRecord::from_partial(PartialComment::default());
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();

        for key in ["channelId", "textDisplay", "likeCount", "publishedAt", "updatedAt"] {
            assert!(keys.contains(&key), "missing {key} in {keys:?}");
        }
    }

    #[test]
    fn test_video_statistics_accept_strings_and_numbers() {
        let video: PartialVideo = serde_json::from_value(json!({
            "snippet": {"title": "Rust in 100 seconds"},
            "statistics": {"viewCount": "1500", "likeCount": 40, "commentCount": "7"}
        }))
        .unwrap();
        let details = VideoDetails::from_partial(video);

        assert_eq!(details.title, "Rust in 100 seconds");
        assert_eq!(details.views, 1500);
        assert_eq!(details.likes, 40);
        assert_eq!(details.dislikes, 0);
        assert_eq!(details.comments, 7);
    }

    #[test]
    fn test_video_without_parts_defaults() {
        let details = VideoDetails::from_partial(PartialVideo::default());
        assert_eq!(details.title, "");
        assert_eq!(details.views, 0);
    }

    #[test]
    fn test_non_numeric_count_is_rejected() {
        let result: Result<VideoStatistics, _> =
            serde_json::from_value(json!({"viewCount": "lots"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_thread_without_top_level_comment_is_rejected() {
        let result: Result<CommentThreadPage, _> =
            serde_json::from_value(json!({"items": [{"snippet": {}}]}));
        assert!(result.is_err());
    }
}
