use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::models::*;
use super::validators::bookmark_target;
use crate::auth::AuthedUser;
use crate::common::{generate_bookmark_id, ApiError, AppState};

/// Video bookmarks only surface while the video is approved
const BOOKMARK_SELECT: &str = r#"
    SELECT b.id, b.artist_id, b.video_id, b.created_at,
           a.stage_name, a.artist_type,
           v.title AS video_title, v.url AS video_url, v.thumbnail_url
    FROM bookmarks b
    LEFT JOIN artists a ON a.id = b.artist_id
    LEFT JOIN videos v ON v.id = b.video_id
    WHERE b.user_id = ? AND (b.video_id IS NULL OR v.is_approved = 1)
"#;

async fn target_exists(db: &SqlitePool, target: &BookmarkTarget) -> Result<bool, ApiError> {
    let found: Option<i64> = match target {
        BookmarkTarget::Artist(id) => {
            sqlx::query_scalar("SELECT 1 FROM artists WHERE id = ?")
                .bind(id)
                .fetch_optional(db)
                .await?
        }
        BookmarkTarget::Video(id) => {
            sqlx::query_scalar("SELECT 1 FROM videos WHERE id = ? AND is_approved = 1")
                .bind(id)
                .fetch_optional(db)
                .await?
        }
    };
    Ok(found.is_some())
}

/// GET /api/bookmarks
pub async fn list_bookmarks(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<BookmarkView>>, ApiError> {
    let state = state_lock.read().await.clone();

    let bookmarks = sqlx::query_as::<_, BookmarkView>(&format!(
        "{} ORDER BY b.created_at DESC, b.id DESC",
        BOOKMARK_SELECT
    ))
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(bookmarks))
}

/// POST /api/bookmarks - `{artist_id}` or `{video_id}`
pub async fn create_bookmark(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateBookmarkRequest>,
) -> Result<(StatusCode, Json<BookmarkView>), ApiError> {
    let state = state_lock.read().await.clone();
    let target = bookmark_target(&request)?;

    if !target_exists(&state.db, &target).await? {
        return Err(ApiError::NotFound("Bookmark target not found".to_string()));
    }

    let (artist_id, video_id) = match &target {
        BookmarkTarget::Artist(id) => (Some(id.as_str()), None),
        BookmarkTarget::Video(id) => (None, Some(id.as_str())),
    };

    let bookmark_id = generate_bookmark_id();
    sqlx::query("INSERT INTO bookmarks (id, user_id, artist_id, video_id) VALUES (?, ?, ?, ?)")
        .bind(&bookmark_id)
        .bind(&authed.id)
        .bind(artist_id)
        .bind(video_id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Already bookmarked".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

    info!(user_id = %authed.id, bookmark_id = %bookmark_id, target = ?target, "Bookmark added");

    let bookmark = sqlx::query_as::<_, BookmarkView>(&format!("{} AND b.id = ?", BOOKMARK_SELECT))
        .bind(&authed.id)
        .bind(&bookmark_id)
        .fetch_one(&state.db)
        .await?;

    Ok((StatusCode::CREATED, Json(bookmark)))
}

/// DELETE /api/bookmarks/:id
pub async fn delete_bookmark(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(bookmark_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM bookmarks WHERE id = ? AND user_id = ?")
        .bind(&bookmark_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Bookmark not found".to_string()));
    }

    info!(user_id = %authed.id, bookmark_id = %bookmark_id, "Bookmark removed");
    Ok(StatusCode::NO_CONTENT)
}
