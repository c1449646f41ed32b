// src/admin/handlers/videos.rs

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Page, Paginated};
use crate::videos::models::{AdminVideoQuery, ApprovalRequest};
use crate::videos::{moderation, Video};

/// GET /api/admin/videos?approved= - every video, moderated or not
pub async fn list_videos(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<AdminVideoQuery>,
) -> Result<Json<Paginated<Video>>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let videos = moderation::list_all(&state.db, query.approved, Page::new(query.page, query.limit)).await?;
    Ok(Json(videos))
}

/// PATCH /api/admin/videos/:id/approval
pub async fn set_video_approval(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(video_id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<Video>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let video = moderation::set_approval(&state.db, &video_id, request.is_approved).await?;
    info!(
        admin_user_id = %authed.id,
        video_id = %video_id,
        approved = request.is_approved,
        "Video approval set"
    );
    Ok(Json(video))
}
