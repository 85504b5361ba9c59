//! YouTube Data API access: retrying client, comment pagination, video details.

mod client;
mod comments;
mod details;
/// Wire types and normalized records
pub mod types;

pub use client::YouTubeClient;
pub use comments::PAGE_SIZE;
pub use types::{CommentRecord, UNKNOWN, VideoDetails};
