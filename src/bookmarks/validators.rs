use super::models::{BookmarkTarget, CreateBookmarkRequest};
use crate::common::ApiError;

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolves the single target a bookmark points at
pub fn bookmark_target(request: &CreateBookmarkRequest) -> Result<BookmarkTarget, ApiError> {
    match (present(&request.artist_id), present(&request.video_id)) {
        (Some(artist_id), None) => Ok(BookmarkTarget::Artist(artist_id)),
        (None, Some(video_id)) => Ok(BookmarkTarget::Video(video_id)),
        _ => Err(ApiError::ValidationError(
            "Provide exactly one of artist_id or video_id".to_string(),
        )),
    }
}
