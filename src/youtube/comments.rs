//! Cursor-based pagination over `commentThreads.list`.

use super::YouTubeClient;
use super::types::{CommentRecord, CommentThreadPage};
use crate::error::Result;

/// Items requested per page (the API maximum)
pub const PAGE_SIZE: u32 = 100;

impl YouTubeClient {
    /// Collect the top-level comments of a video in pagination order
    ///
    /// Pages are fetched until the service stops returning a continuation
    /// token. With `max_results` set, collection also stops once at least that
    /// many comments are held; the bound is checked between pages, so the
    /// result can be longer than `max_results` and is not truncated.
    ///
    /// Any failure aborts the whole collection.
    pub async fn fetch_comments(
        &self,
        video_id: &str,
        max_results: Option<usize>,
    ) -> Result<Vec<CommentRecord>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            tracing::info!(
                video_id,
                page_token = page_token.as_deref().unwrap_or(""),
                "Fetching comments page"
            );

            let mut query = vec![
                ("part", "snippet".to_string()),
                ("videoId", video_id.to_string()),
                ("textFormat", "plainText".to_string()),
                ("maxResults", PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let page: CommentThreadPage = self
                .execute("commentThreads", &query)
                .await
                .inspect_err(|e| {
                    tracing::error!(video_id, error = %e, "Error fetching comments");
                })?;

            comments.extend(
                page.items
                    .into_iter()
                    .map(|thread| CommentRecord::from_partial(thread.snippet.top_level_comment.snippet)),
            );

            page_token = page.next_page_token.filter(|t| !t.is_empty());

            let reached_limit = max_results.is_some_and(|max| comments.len() >= max);
            if page_token.is_none() || reached_limit {
                break;
            }
        }

        tracing::info!(video_id, count = comments.len(), "Retrieved comments");
        Ok(comments)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RetryConfig, YouTubeConfig};
    use crate::error::Error;
    use serde_json::{Value, json};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> YouTubeClient {
        YouTubeClient::new(
            YouTubeConfig {
                api_key: "k".to_string(),
                base_url: server.uri(),
                timeout: Duration::from_secs(5),
            },
            RetryConfig {
                max_attempts: 3,
                initial_delay: Duration::from_millis(1),
                min_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                backoff_multiplier: 2.0,
                jitter: false,
            },
        )
        .unwrap()
    }

    fn thread(author: &str, text: &str, likes: u64) -> Value {
        json!({
            "snippet": {
                "topLevelComment": {
                    "snippet": {
                        "authorChannelId": {"value": author},
                        "textDisplay": text,
                        "likeCount": likes,
                        "publishedAt": "2024-01-01T00:00:00Z",
                        "updatedAt": "2024-01-01T00:00:00Z"
                    }
                }
            }
        })
    }

    async fn mount_page(server: &MockServer, token: Option<&str>, body: Value) {
        let mock = Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("videoId", "vid1"))
            .and(query_param("maxResults", "100"))
            .and(query_param("textFormat", "plainText"));
        let mock = match token {
            Some(t) => mock.and(query_param("pageToken", t)),
            None => mock.and(query_param_is_missing("pageToken")),
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn three_pages(server: &MockServer) {
        mount_page(
            server,
            None,
            json!({"items": [thread("a", "one", 1), thread("b", "two", 2)], "nextPageToken": "p2"}),
        )
        .await;
        mount_page(
            server,
            Some("p2"),
            json!({"items": [thread("c", "three", 3)], "nextPageToken": "p3"}),
        )
        .await;
        mount_page(
            server,
            Some("p3"),
            json!({"items": [thread("d", "four", 4), thread("e", "five", 5)]}),
        )
        .await;
    }

    #[tokio::test]
    async fn test_pages_concatenate_in_order() {
        let server = MockServer::start().await;
        three_pages(&server).await;

        let comments = client(&server).fetch_comments("vid1", None).await.unwrap();

        let texts: Vec<&str> = comments.iter().map(|c| c.text_display.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three", "four", "five"]);
        let likes: Vec<u64> = comments.iter().map(|c| c.like_count).collect();
        assert_eq!(likes, vec![1, 2, 3, 4, 5]);
        assert_eq!(comments[2].channel_id, "c");
    }

    #[tokio::test]
    async fn test_rerun_yields_identical_output() {
        let server = MockServer::start().await;
        three_pages(&server).await;
        let client = client(&server);

        let first = client.fetch_comments("vid1", None).await.unwrap();
        let second = client.fetch_comments("vid1", None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_limit_checked_per_page_not_truncated() {
        let server = MockServer::start().await;
        three_pages(&server).await;

        // first page already holds 2 >= 1, so the second page is never requested
        let comments = client(&server).fetch_comments("vid1", Some(1)).await.unwrap();
        assert_eq!(comments.len(), 2);

        // 2 < 3 after page one, 3 >= 3 after page two
        let comments = client(&server).fetch_comments("vid1", Some(3)).await.unwrap();
        assert_eq!(comments.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_next_page_token_ends_pagination() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            None,
            json!({"items": [thread("a", "only", 0)], "nextPageToken": ""}),
        )
        .await;

        let comments = client(&server).fetch_comments("vid1", None).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_use_sentinels() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            None,
            json!({"items": [{"snippet": {"topLevelComment": {"snippet": {}}}}]}),
        )
        .await;

        let comments = client(&server).fetch_comments("vid1", None).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].channel_id, "Unknown");
        assert_eq!(comments[0].text_display, "");
        assert_eq!(comments[0].like_count, 0);
        assert_eq!(comments[0].published_at, "Unknown");
    }

    #[tokio::test]
    async fn test_failure_on_later_page_discards_partial_result() {
        let server = MockServer::start().await;
        mount_page(
            &server,
            None,
            json!({"items": [thread("a", "one", 1)], "nextPageToken": "p2"}),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/commentThreads"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(403).set_body_string("commentsDisabled"))
            .mount(&server)
            .await;

        let err = client(&server).fetch_comments("vid1", None).await.unwrap_err();
        assert!(matches!(err, Error::PermanentService { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_malformed_item_is_an_error() {
        let server = MockServer::start().await;
        mount_page(&server, None, json!({"items": [{"snippet": {}}]})).await;

        let err = client(&server).fetch_comments("vid1", None).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
