use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Bookmark with enough of its target to render a saved list
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BookmarkView {
    pub id: String,
    pub artist_id: Option<String>,
    pub video_id: Option<String>,
    pub created_at: Option<String>,
    pub stage_name: Option<String>,
    pub artist_type: Option<String>,
    pub video_title: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Exactly one of `artist_id` / `video_id`
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookmarkRequest {
    pub artist_id: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkTarget {
    Artist(String),
    Video(String),
}
