// src/videos/handlers.rs

use axum::{
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::models::*;
use super::moderation::{self, VideoFilter};
use super::validators::{detect_video_mime, UploadValidator};
use crate::auth::AuthedUser;
use crate::common::{generate_video_id, ApiError, AppState, Page, Paginated, Validator};
use crate::services::aws::AwsError;

/// GET /api/videos - approved videos, optionally shorts only or one artist's
pub async fn list_videos(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(query): Query<VideoListQuery>,
) -> Result<Json<Paginated<Video>>, ApiError> {
    let state = state_lock.read().await.clone();

    let filter = VideoFilter {
        short: query.short,
        artist_id: query.artist_id,
    };
    let page = Page::new(query.page, query.limit);

    Ok(Json(moderation::list_approved(&state.db, &filter, page).await?))
}

/// GET /api/videos/:id - approved video detail, counts a view
pub async fn get_video(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(video_id): Path<String>,
) -> Result<Json<Video>, ApiError> {
    let state = state_lock.read().await.clone();
    Ok(Json(moderation::view_approved(&state.db, &video_id).await?))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "video" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read video data: {}", e)))?;
                form.data = Some(bytes.to_vec());
            }
            "title" | "description" | "is_short" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read {}: {}", name, e)))?;
                match name.as_str() {
                    "title" => form.title = Some(value.trim().to_string()),
                    "description" => form.description = Some(value).filter(|d| !d.trim().is_empty()),
                    _ => form.is_short = matches!(value.trim(), "true" | "1"),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// POST /api/videos - multipart upload (`video`, `title`, `description`, `is_short`)
///
/// Stored in S3 and held for moderation until an admin approves it.
pub async fn upload_video(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Video>), ApiError> {
    let state = state_lock.read().await.clone();

    let form = read_upload_form(multipart).await?;
    UploadValidator.validate(&form).into_result()?;

    let (data, title) = match (form.data, form.title) {
        (Some(data), Some(title)) => (data, title),
        _ => return Err(ApiError::BadRequest("Video and title are required".to_string())),
    };
    let (mime_type, extension) = detect_video_mime(&data)
        .ok_or_else(|| ApiError::BadRequest("Unsupported video format".to_string()))?;

    let video_id = generate_video_id();
    let storage_key = format!("videos/{}/{}.{}", authed.id, video_id, extension);
    let size = data.len();

    let url = state
        .aws_service
        .upload_file(data, &storage_key, mime_type)
        .await
        .map_err(|e| match e {
            AwsError::NotConfigured => {
                ApiError::ServiceUnavailable("Video storage is not configured".to_string())
            }
            other => {
                error!(error = %other, user_id = %authed.id, "Video upload failed");
                ApiError::InternalServer("Failed to upload video".to_string())
            }
        })?;

    sqlx::query(
        r#"
        INSERT INTO videos (id, user_id, title, description, url, storage_key, is_short, source, is_approved)
        VALUES (?, ?, ?, ?, ?, ?, ?, 'upload', 0)
        "#,
    )
    .bind(&video_id)
    .bind(&authed.id)
    .bind(&title)
    .bind(&form.description)
    .bind(&url)
    .bind(&storage_key)
    .bind(form.is_short)
    .execute(&state.db)
    .await?;

    info!(
        user_id = %authed.id,
        video_id = %video_id,
        size_bytes = size,
        is_short = form.is_short,
        "Video uploaded, awaiting moderation"
    );

    let video = sqlx::query_as::<_, Video>(&format!(
        "SELECT {} FROM videos WHERE id = ?",
        VIDEO_COLUMNS
    ))
    .bind(&video_id)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(video)))
}

/// GET /api/me/videos
pub async fn my_videos(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<OwnerVideos>, ApiError> {
    let state = state_lock.read().await.clone();

    let videos = moderation::approved_for_user(&state.db, &authed.id).await?;
    let pending_count = moderation::pending_count(&state.db, &authed.id).await?;

    Ok(Json(OwnerVideos {
        videos,
        pending_count,
    }))
}

/// DELETE /api/videos/:id
/// Someone else's video is reported as missing.
pub async fn delete_video(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(video_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let storage_key: Option<Option<String>> =
        sqlx::query_scalar("SELECT storage_key FROM videos WHERE id = ? AND user_id = ?")
            .bind(&video_id)
            .bind(&authed.id)
            .fetch_optional(&state.db)
            .await?;
    let storage_key = storage_key.ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

    let result = sqlx::query("DELETE FROM videos WHERE id = ? AND user_id = ?")
        .bind(&video_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    if let Some(key) = storage_key {
        if let Err(e) = state.aws_service.delete_file(&key).await {
            warn!(error = %e, key = %key, "Failed to delete stored video object");
        }
    }

    info!(user_id = %authed.id, video_id = %video_id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}
