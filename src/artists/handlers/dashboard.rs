// src/artists/handlers/dashboard.rs

use axum::extract::{Extension, Json, Query};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::auth::{Actor, AuthedUser};
use crate::bookings::models::BookingListQuery;
use crate::bookings::services::{BookingParty, BookingsService};
use crate::bookings::Booking;
use crate::common::{ApiError, AppState, Page, Paginated};

/// GET /api/artists/dashboard/bookings?status=&page=&limit=
pub async fn dashboard_bookings(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Paginated<Booking>>, ApiError> {
    let state = state_lock.read().await.clone();
    let actor = Actor::load(&state.db, &authed).await?;
    let artist_id = actor.require_artist()?;

    let bookings = BookingsService::new(state.db.clone())
        .list(
            BookingParty::Artist(artist_id),
            query.status.as_deref(),
            Page::new(query.page, query.limit),
        )
        .await?;
    Ok(Json(bookings))
}
