// src/artists/handlers/profile.rs

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::artists::models::*;
use crate::artists::services::ArtistsService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState, Paginated};

/// GET /api/artists
pub async fn list_artists(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(query): Query<ArtistListQuery>,
) -> Result<Json<Paginated<Artist>>, ApiError> {
    let state = state_lock.read().await.clone();
    Ok(Json(ArtistsService::new(state.db.clone()).list(&query).await?))
}

/// GET /api/artists/:id - profile plus approved videos
pub async fn get_artist(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(artist_id): Path<String>,
) -> Result<Json<ArtistDetail>, ApiError> {
    let state = state_lock.read().await.clone();
    Ok(Json(ArtistsService::new(state.db.clone()).detail(&artist_id).await?))
}

/// GET /api/artists/profile
pub async fn get_my_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Artist>, ApiError> {
    let state = state_lock.read().await.clone();
    let artist = ArtistsService::new(state.db.clone())
        .for_user(&authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;
    Ok(Json(artist))
}

/// POST /api/artists/profile
pub async fn create_my_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateArtistProfileRequest>,
) -> Result<(StatusCode, Json<Artist>), ApiError> {
    let state = state_lock.read().await.clone();
    let artist = ArtistsService::new(state.db.clone())
        .create(&authed.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(artist)))
}

/// PUT /api/artists/profile
pub async fn update_my_profile(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<UpdateArtistProfileRequest>,
) -> Result<Json<Artist>, ApiError> {
    let state = state_lock.read().await.clone();
    let artist = ArtistsService::new(state.db.clone())
        .update(&authed.id, request)
        .await?;
    Ok(Json(artist))
}
