//! Booking status transitions
//!
//! Checks run in a fixed order: artist profile, existence, ownership,
//! terminal state, artist-settable target, transition table. The write is
//! conditioned on the status that was checked.

use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use super::models::{join_statuses, BookingStatus, BookingStatusChange};
use crate::auth::Actor;
use crate::common::ApiError;

#[derive(Debug, FromRow)]
struct BookingState {
    id: String,
    artist_id: String,
    status: String,
    event_date: String,
}

impl BookingState {
    fn current(&self) -> Result<BookingStatus, ApiError> {
        BookingStatus::parse(&self.status).ok_or_else(|| {
            ApiError::InternalServer(format!("Unknown booking status {}", self.status))
        })
    }
}

async fn load_state(db: &SqlitePool, booking_id: &str) -> Result<BookingState, ApiError> {
    sqlx::query_as::<_, BookingState>(
        "SELECT id, artist_id, status, event_date FROM bookings WHERE id = ?",
    )
    .bind(booking_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))
}

/// Artist-driven status change for `PUT /api/bookings/:id`
pub async fn transition(
    db: &SqlitePool,
    actor: &Actor,
    booking_id: &str,
    requested: &str,
) -> Result<BookingStatusChange, ApiError> {
    let artist_id = actor.require_artist()?;
    let booking = load_state(db, booking_id).await?;

    if booking.artist_id != artist_id {
        warn!(
            user_id = %actor.user_id,
            booking_id = %booking_id,
            "Status change attempted on another artist's booking"
        );
        return Err(ApiError::Forbidden(
            "You can only update your own bookings".to_string(),
        ));
    }

    let current = booking.current()?;
    if current == BookingStatus::Completed {
        return Err(ApiError::BadRequest(
            "Completed bookings cannot be changed".to_string(),
        ));
    }

    let next = BookingStatus::parse(requested)
        .filter(|status| BookingStatus::ARTIST_SETTABLE.contains(status))
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid status. Must be one of: {}",
                join_statuses(&BookingStatus::ARTIST_SETTABLE)
            ))
        })?;

    apply(db, booking, current, next).await
}

/// Admin marks an approved booking as completed
pub async fn complete(db: &SqlitePool, booking_id: &str) -> Result<BookingStatusChange, ApiError> {
    let booking = load_state(db, booking_id).await?;
    let current = booking.current()?;
    apply(db, booking, current, BookingStatus::Completed).await
}

async fn apply(
    db: &SqlitePool,
    booking: BookingState,
    current: BookingStatus,
    next: BookingStatus,
) -> Result<BookingStatusChange, ApiError> {
    if !current.can_transition_to(next) {
        return Err(ApiError::BadRequest(format!(
            "Cannot change status from {} to {}. Valid next states: {}",
            current,
            next,
            join_statuses(current.allowed_targets())
        )));
    }

    let result = sqlx::query(
        "UPDATE bookings SET status = ?, updated_at = datetime('now') WHERE id = ? AND status = ?",
    )
    .bind(next.as_str())
    .bind(&booking.id)
    .bind(current.as_str())
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        warn!(booking_id = %booking.id, from = %current, to = %next, "Booking status changed concurrently");
        return Err(ApiError::Conflict(
            "Booking was updated by another request, please retry".to_string(),
        ));
    }

    info!(booking_id = %booking.id, from = %current, to = %next, "Booking status updated");

    Ok(BookingStatusChange {
        id: booking.id,
        status: next,
        event_date: booking.event_date,
    })
}
