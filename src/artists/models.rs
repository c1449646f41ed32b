//! Artist profile models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::helpers::serialize_json_list;
use crate::videos::Video;

/// Public profile columns; integration tokens are never selected
pub const ARTIST_COLUMNS: &str = "id, user_id, stage_name, artist_type, bio, location, languages, \
     price_min, price_max, created_at, updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Artist {
    pub id: String,
    pub user_id: String,
    pub stage_name: String,
    pub artist_type: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// JSON array in the database, a list on the wire
    #[serde(serialize_with = "serialize_json_list")]
    pub languages: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Public artist page
#[derive(Debug, Serialize)]
pub struct ArtistDetail {
    #[serde(flatten)]
    pub artist: Artist,
    pub videos: Vec<Video>,
}

#[derive(Debug, Deserialize)]
pub struct CreateArtistProfileRequest {
    pub stage_name: String,
    pub artist_type: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

/// Partial update; absent fields keep their value
#[derive(Debug, Default, Deserialize)]
pub struct UpdateArtistProfileRequest {
    pub stage_name: Option<String>,
    pub artist_type: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub languages: Option<Vec<String>>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

/// `GET /api/artists` filters
#[derive(Debug, Default, Deserialize)]
pub struct ArtistListQuery {
    pub q: Option<String>,
    pub artist_type: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    /// Artists whose range reaches at least this amount
    pub min_price: Option<i64>,
    /// Artists whose range starts at or below this amount
    pub max_price: Option<i64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
