//! Mock YouTube Data API responses

use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A comment thread resource with a fully populated snippet
pub fn comment_thread(author: &str, text: &str, likes: u64) -> Value {
    json!({
        "snippet": {
            "topLevelComment": {
                "snippet": {
                    "authorChannelId": {"value": author},
                    "textDisplay": text,
                    "likeCount": likes,
                    "publishedAt": "2024-05-01T12:00:00Z",
                    "updatedAt": "2024-05-01T12:00:00Z"
                }
            }
        }
    })
}

/// Serve one `commentThreads` page for `video_id`
///
/// `token` is the page token the request must carry (`None` for the first page).
pub async fn mount_comment_page(
    server: &MockServer,
    video_id: &str,
    token: Option<&str>,
    items: Vec<Value>,
    next_page_token: Option<&str>,
) {
    let mut body = json!({ "items": items });
    if let Some(next) = next_page_token {
        body["nextPageToken"] = json!(next);
    }

    let mock = Mock::given(method("GET"))
        .and(path("/commentThreads"))
        .and(query_param("videoId", video_id))
        .and(query_param("part", "snippet"));
    let mock = match token {
        Some(t) => mock.and(query_param("pageToken", t)),
        None => mock.and(query_param_is_missing("pageToken")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Serve `videos` details for `video_id`
pub async fn mount_video(server: &MockServer, video_id: &str, title: &str, views: &str) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", video_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "snippet": {"title": title},
                "statistics": {
                    "viewCount": views,
                    "likeCount": "10",
                    "commentCount": "3"
                }
            }]
        })))
        .mount(server)
        .await;
}

/// Answer every request for `video_id` with `status`
pub async fn mount_video_status(server: &MockServer, video_id: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", video_id))
        .respond_with(ResponseTemplate::new(status).set_body_string("error"))
        .mount(server)
        .await;
}
