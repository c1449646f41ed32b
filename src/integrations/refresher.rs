//! Hands out a usable provider access token, refreshing it when close to expiry

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::store;
use crate::common::{safe_token_log, ApiError};
use crate::services::OAuthProvider;

/// Tokens expiring within this window are refreshed before use
pub const REFRESH_BUFFER_MINUTES: i64 = 5;

fn is_fresh(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expiry.map_or(false, |exp| exp > now + Duration::minutes(REFRESH_BUFFER_MINUTES))
}

/// `Ok(None)` means the artist is not connected or the token could not be refreshed
pub async fn get_valid_token(
    db: &SqlitePool,
    provider: &dyn OAuthProvider,
    artist_id: &str,
) -> Result<Option<String>, ApiError> {
    get_valid_token_at(db, provider, artist_id, Utc::now()).await
}

pub async fn get_valid_token_at(
    db: &SqlitePool,
    provider: &dyn OAuthProvider,
    artist_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>, ApiError> {
    let kind = provider.provider();

    let Some(stored) = store::load_tokens(db, kind, artist_id).await? else {
        return Ok(None);
    };
    let Some(access_token) = stored.access_token.clone() else {
        debug!(artist_id = %artist_id, provider = %kind, "Provider not connected");
        return Ok(None);
    };

    if is_fresh(stored.expiry_time(), now) {
        return Ok(Some(access_token));
    }

    debug!(artist_id = %artist_id, provider = %kind, "Access token stale, refreshing");

    let refreshed = match provider
        .refresh(&access_token, stored.refresh_token.as_deref())
        .await
    {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(
                error = %e,
                artist_id = %artist_id,
                provider = %kind,
                "Token refresh failed; artist must reconnect"
            );
            return Ok(None);
        }
    };

    let new_expiry = (now + Duration::seconds(refreshed.expires_in)).to_rfc3339();
    let written = store::save_refreshed(
        db,
        kind,
        artist_id,
        &refreshed,
        &new_expiry,
        stored.expiry.as_deref(),
    )
    .await?;

    if written {
        info!(
            artist_id = %artist_id,
            provider = %kind,
            token = %safe_token_log(&refreshed.access_token),
            expires_at = %new_expiry,
            "Access token refreshed"
        );
        return Ok(Some(refreshed.access_token));
    }

    // Lost the race: another request refreshed or the artist disconnected
    let current = store::load_tokens(db, kind, artist_id).await?;
    Ok(current.and_then(|tokens| {
        if is_fresh(tokens.expiry_time(), now) {
            tokens.access_token
        } else {
            None
        }
    }))
}
