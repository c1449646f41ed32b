// src/admin/handlers/dashboard.rs

use axum::{extract::Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::admin::models::DashboardMetrics;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppState};

async fn count(db: &sqlx::SqlitePool, sql: &str) -> Result<i64, ApiError> {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, query = %sql, "Database error fetching dashboard metric");
            ApiError::DatabaseError(e)
        })
}

/// GET /api/admin/dashboard/metrics - marketplace counters
pub async fn get_dashboard_metrics(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<DashboardMetrics>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    info!(admin_user_id = %authed.id, "Fetching dashboard metrics");

    let total_users = count(&state.db, "SELECT COUNT(*) FROM users").await?;
    let total_artists = count(&state.db, "SELECT COUNT(*) FROM artists").await?;
    let pending_videos = count(&state.db, "SELECT COUNT(*) FROM videos WHERE is_approved = 0").await?;
    let approved_videos = count(&state.db, "SELECT COUNT(*) FROM videos WHERE is_approved = 1").await?;

    let bookings_by_status = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM bookings GROUP BY status",
    )
    .fetch_all(&state.db)
    .await?
    .into_iter()
    .collect();

    Ok(Json(DashboardMetrics {
        total_users,
        total_artists,
        pending_videos,
        approved_videos,
        bookings_by_status,
        last_updated: Utc::now().to_rfc3339(),
    }))
}
