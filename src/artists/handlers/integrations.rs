// src/artists/handlers/integrations.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    response::Redirect,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::auth::{Actor, AuthedUser};
use crate::common::{ApiError, AppState};
use crate::integrations::connect::{self, CallbackParams};
use crate::integrations::store::{self, IntegrationStatus};
use crate::integrations::{syncer, SyncReport};
use crate::services::Provider;

fn parse_provider(raw: &str) -> Result<Provider, ApiError> {
    Provider::parse(raw).ok_or_else(|| ApiError::NotFound(format!("Unknown integration: {}", raw)))
}

/// GET /api/artists/integrations
pub async fn integration_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<IntegrationStatus>, ApiError> {
    let state = state_lock.read().await.clone();
    let actor = Actor::load(&state.db, &authed).await?;
    let artist_id = actor.require_artist()?;

    Ok(Json(store::connection_status(&state.db, artist_id).await?))
}

/// GET /api/artists/integrations/:provider/connect
/// Returns the provider consent URL; the browser is sent there by the frontend.
pub async fn connect_integration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(provider): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let provider = parse_provider(&provider)?;
    let state = state_lock.read().await.clone();
    let actor = Actor::load(&state.db, &authed).await?;
    actor.require_artist()?;

    let client = state.providers.get(provider)?;
    let auth_url = connect::authorization_url(
        client.as_ref(),
        &state.config.jwt_secret,
        &authed.id,
        Utc::now(),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %authed.id, "Failed to sign OAuth state");
        ApiError::InternalServer("Failed to start integration".to_string())
    })?;

    info!(user_id = %authed.id, provider = %provider, "Integration connect started");
    Ok(Json(json!({ "auth_url": auth_url })))
}

/// GET /api/artists/integrations/:provider/callback
/// Unauthenticated; the HS256 `state` issued by connect identifies the user.
pub async fn integration_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, ApiError> {
    let provider = parse_provider(&provider)?;
    let state = state_lock.read().await.clone();

    let outcome = match state.providers.get(provider) {
        Ok(client) => {
            connect::complete_connection(
                &state.db,
                client.as_ref(),
                &state.config.jwt_secret,
                &params,
                Utc::now(),
            )
            .await
        }
        Err(e) => {
            warn!(error = %e, provider = %provider, "Callback for unconfigured integration");
            Err("connection_failed")
        }
    };

    Ok(Redirect::to(&connect::redirect_url(
        &state.config.frontend_url,
        provider,
        outcome,
    )))
}

/// POST /api/artists/integrations/:provider/disconnect
pub async fn disconnect_integration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(provider): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let provider = parse_provider(&provider)?;
    let state = state_lock.read().await.clone();
    let actor = Actor::load(&state.db, &authed).await?;
    let artist_id = actor.require_artist()?;

    store::disconnect(&state.db, provider, artist_id).await?;

    info!(artist_id = %artist_id, provider = %provider, "Integration disconnected");
    Ok(Json(json!({
        "message": format!("{} disconnected", provider.display_name()),
        "provider": provider.as_str(),
    })))
}

/// POST /api/artists/integrations/:provider/sync
/// YouTube imports shorts, Instagram imports reels; both wait for moderation.
pub async fn sync_integration(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(provider): Path<String>,
) -> Result<Json<SyncReport>, ApiError> {
    let provider = parse_provider(&provider)?;
    let state = state_lock.read().await.clone();
    let actor = Actor::load(&state.db, &authed).await?;
    let artist_id = actor.require_artist()?;

    let client = state.providers.get(provider)?;
    let report = syncer::sync(&state.db, client.as_ref(), artist_id).await?;
    Ok(Json(report))
}
