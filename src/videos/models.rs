//! Video data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Columns selected into [`Video`]
pub const VIDEO_COLUMNS: &str = "id, user_id, title, description, url, thumbnail_url, storage_key, \
     duration_seconds, is_short, source, is_approved, views, created_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    #[serde(skip)]
    pub storage_key: Option<String>,
    pub duration_seconds: Option<i64>,
    pub is_short: bool,
    pub source: String,
    pub is_approved: bool,
    pub views: i64,
    pub created_at: Option<String>,
}

/// `GET /api/videos` query
#[derive(Debug, Default, Deserialize)]
pub struct VideoListQuery {
    pub short: Option<bool>,
    pub artist_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// `GET /api/admin/videos` query
#[derive(Debug, Default, Deserialize)]
pub struct AdminVideoQuery {
    pub approved: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub is_approved: bool,
}

/// Owner's approved videos plus how many still wait for moderation
#[derive(Debug, Serialize)]
pub struct OwnerVideos {
    pub videos: Vec<Video>,
    pub pending_count: i64,
}

/// Fields collected from the upload form
#[derive(Debug, Default)]
pub struct UploadForm {
    pub data: Option<Vec<u8>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_short: bool,
}
