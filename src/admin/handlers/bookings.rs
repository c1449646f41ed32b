// src/admin/handlers/bookings.rs

use axum::extract::{Extension, Json, Path};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::auth::AuthedUser;
use crate::bookings::lifecycle;
use crate::bookings::models::BookingStatusChange;
use crate::common::{ApiError, AppState};

/// POST /api/admin/bookings/:id/complete - APPROVED → COMPLETED
pub async fn complete_booking(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(booking_id): Path<String>,
) -> Result<Json<BookingStatusChange>, ApiError> {
    authed.require_admin()?;
    let state = state_lock.read().await.clone();

    let change = lifecycle::complete(&state.db, &booking_id).await?;
    info!(admin_user_id = %authed.id, booking_id = %booking_id, "Booking marked completed");
    Ok(Json(change))
}
