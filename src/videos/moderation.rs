//! Video queries behind the moderation gate
//!
//! Public and owner reads only ever see rows with `is_approved = 1`. The
//! admin functions at the bottom are the only ones that skip the gate.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::models::{Video, VIDEO_COLUMNS};
use crate::common::{ApiError, Page, Paginated};

/// Predicate appended to every non-admin video query
const APPROVED: &str = "is_approved = 1";

#[derive(Debug, Default, Clone)]
pub struct VideoFilter {
    pub short: Option<bool>,
    pub artist_id: Option<String>,
}

fn push_public_filters(builder: &mut QueryBuilder<'_, Sqlite>, filter: &VideoFilter) {
    builder.push(" WHERE ").push(APPROVED);
    if let Some(short) = filter.short {
        builder.push(" AND is_short = ").push_bind(short);
    }
    if let Some(artist_id) = &filter.artist_id {
        builder
            .push(" AND user_id = (SELECT user_id FROM artists WHERE id = ")
            .push_bind(artist_id.clone())
            .push(")");
    }
}

pub async fn list_approved(
    db: &SqlitePool,
    filter: &VideoFilter,
    page: Page,
) -> Result<Paginated<Video>, ApiError> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM videos");
    push_public_filters(&mut count, filter);
    let (total,): (i64,) = count.build_query_as().fetch_one(db).await?;

    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM videos", VIDEO_COLUMNS));
    push_public_filters(&mut query, filter);
    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let videos = query.build_query_as::<Video>().fetch_all(db).await?;

    Ok(Paginated::new(videos, total, page))
}

/// Approved video detail; the view counter is bumped in the same transaction
pub async fn view_approved(db: &SqlitePool, video_id: &str) -> Result<Video, ApiError> {
    let mut tx = db.begin().await?;

    let updated = sqlx::query(&format!(
        "UPDATE videos SET views = views + 1 WHERE id = ? AND {}",
        APPROVED
    ))
    .bind(video_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    let video = sqlx::query_as::<_, Video>(&format!(
        "SELECT {} FROM videos WHERE id = ? AND {}",
        VIDEO_COLUMNS, APPROVED
    ))
    .bind(video_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(video)
}

/// Approved videos uploaded or synced by `user_id`, newest first
pub async fn approved_for_user(db: &SqlitePool, user_id: &str) -> Result<Vec<Video>, ApiError> {
    let videos = sqlx::query_as::<_, Video>(&format!(
        "SELECT {} FROM videos WHERE user_id = ? AND {} ORDER BY created_at DESC, id DESC",
        VIDEO_COLUMNS, APPROVED
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(videos)
}

pub async fn pending_count(db: &SqlitePool, user_id: &str) -> Result<i64, ApiError> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE user_id = ? AND is_approved = 0")
        .bind(user_id)
        .fetch_one(db)
        .await?;
    Ok(count)
}

// ============================================================================
// Admin (ungated)
// ============================================================================

pub async fn list_all(
    db: &SqlitePool,
    approved: Option<bool>,
    page: Page,
) -> Result<Paginated<Video>, ApiError> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM videos");
    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM videos", VIDEO_COLUMNS));
    if let Some(approved) = approved {
        count.push(" WHERE is_approved = ").push_bind(approved);
        query.push(" WHERE is_approved = ").push_bind(approved);
    }

    let (total,): (i64,) = count.build_query_as().fetch_one(db).await?;

    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let videos = query.build_query_as::<Video>().fetch_all(db).await?;

    Ok(Paginated::new(videos, total, page))
}

/// Writes the approval flag unconditionally, so repeating a decision is a no-op
pub async fn set_approval(
    db: &SqlitePool,
    video_id: &str,
    approved: bool,
) -> Result<Video, ApiError> {
    let result = sqlx::query("UPDATE videos SET is_approved = ? WHERE id = ?")
        .bind(approved)
        .bind(video_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    info!(video_id = %video_id, approved = approved, "Video moderation updated");

    let video = sqlx::query_as::<_, Video>(&format!(
        "SELECT {} FROM videos WHERE id = ?",
        VIDEO_COLUMNS
    ))
    .bind(video_id)
    .fetch_one(db)
    .await?;
    Ok(video)
}
