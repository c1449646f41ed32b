//! Imports an artist's short-form videos from a connected provider

use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashSet;
use tracing::{error, info};

use super::{refresher, store};
use crate::common::{generate_video_id, ApiError};
use crate::services::instagram::SYNCED_MEDIA_TYPES;
use crate::services::oauth::MediaItem;
use crate::services::youtube::is_short_duration;
use crate::services::{OAuthProvider, Provider};

/// Provider pages followed per sync
pub const MAX_SYNC_PAGES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced: usize,
    pub skipped: usize,
    pub total: usize,
}

fn is_syncable(provider: Provider, item: &MediaItem) -> bool {
    match provider {
        Provider::Instagram => SYNCED_MEDIA_TYPES.contains(&item.media_type.as_str()),
        Provider::YouTube => item.duration_seconds.map_or(false, is_short_duration),
    }
}

/// Keeps items whose URL is neither stored nor repeated earlier in the batch
fn new_items<'a>(items: &'a [MediaItem], stored_urls: &HashSet<String>) -> Vec<&'a MediaItem> {
    let mut seen: HashSet<&str> = HashSet::new();
    items
        .iter()
        .filter(|item| !stored_urls.contains(&item.url) && seen.insert(item.url.as_str()))
        .collect()
}

pub async fn sync(
    db: &SqlitePool,
    provider: &dyn OAuthProvider,
    artist_id: &str,
) -> Result<SyncReport, ApiError> {
    let kind = provider.provider();

    let user_id = store::artist_user_id(db, artist_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

    let token = refresher::get_valid_token(db, provider, artist_id)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Please reconnect your {} account",
                kind.display_name()
            ))
        })?;

    let fetched = provider
        .list_media(&token, MAX_SYNC_PAGES)
        .await
        .map_err(|e| {
            error!(error = %e, artist_id = %artist_id, provider = %kind, "Failed to fetch provider media");
            ApiError::InternalServer(format!("Failed to fetch {} media", kind.display_name()))
        })?;

    let items: Vec<MediaItem> = fetched
        .into_iter()
        .filter(|item| is_syncable(kind, item))
        .collect();
    let total = items.len();

    let stored_urls: HashSet<String> = sqlx::query_scalar::<_, String>(
        "SELECT url FROM videos WHERE user_id = ? AND source = ? AND is_short = 1",
    )
    .bind(&user_id)
    .bind(kind.as_str())
    .fetch_all(db)
    .await?
    .into_iter()
    .collect();

    let fresh = new_items(&items, &stored_urls);

    let synced = if fresh.is_empty() {
        0
    } else {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT OR IGNORE INTO videos (id, user_id, title, url, thumbnail_url, duration_seconds, is_short, source, is_approved) ",
        );
        builder.push_values(fresh.iter(), |mut row, item| {
            row.push_bind(generate_video_id())
                .push_bind(&user_id)
                .push_bind(&item.title)
                .push_bind(&item.url)
                .push_bind(item.thumbnail_url.as_deref())
                .push_bind(item.duration_seconds)
                .push_bind(true)
                .push_bind(kind.as_str())
                .push_bind(false);
        });

        // Rows ignored here were inserted by a concurrent sync
        builder.build().execute(db).await?.rows_affected() as usize
    };

    let report = SyncReport {
        synced,
        skipped: total - synced,
        total,
    };

    info!(
        artist_id = %artist_id,
        provider = %kind,
        synced = report.synced,
        skipped = report.skipped,
        total = report.total,
        "Provider sync complete"
    );
    Ok(report)
}
