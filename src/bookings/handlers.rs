use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::lifecycle;
use super::models::*;
use super::services::{BookingParty, BookingsService};
use crate::auth::{Actor, AuthedUser};
use crate::common::{ApiError, AppState, Page, Paginated};

/// POST /api/bookings - request a booking with an artist
pub async fn create_booking(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let state = state_lock.read().await.clone();
    let booking = BookingsService::new(state.db.clone())
        .create(&authed.id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings - bookings the caller made as a client
pub async fn list_my_bookings(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Paginated<Booking>>, ApiError> {
    let state = state_lock.read().await.clone();
    let bookings = BookingsService::new(state.db.clone())
        .list(
            BookingParty::Client(&authed.id),
            query.status.as_deref(),
            Page::new(query.page, query.limit),
        )
        .await?;
    Ok(Json(bookings))
}

/// GET /api/bookings/:id
pub async fn get_booking(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(booking_id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    let state = state_lock.read().await.clone();
    let actor = Actor::load(&state.db, &authed).await?;
    let booking = BookingsService::new(state.db.clone())
        .get_for(&actor, &booking_id)
        .await?;
    Ok(Json(booking))
}

/// PUT /api/bookings/:id - artist approves, declines or cancels
pub async fn update_booking_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(booking_id): Path<String>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<BookingStatusChange>, ApiError> {
    let state = state_lock.read().await.clone();
    let actor = Actor::load(&state.db, &authed).await?;
    let change = lifecycle::transition(&state.db, &actor, &booking_id, &request.new_status).await?;
    Ok(Json(change))
}
