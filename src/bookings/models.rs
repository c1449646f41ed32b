//! Booking data models and the status enum

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Booking rows joined with the names shown on both dashboards
pub const BOOKING_SELECT: &str = r#"
    SELECT b.id, b.client_id, b.artist_id, b.status, b.event_date, b.event_type,
           b.location, b.price, b.notes, b.created_at, b.updated_at,
           a.stage_name AS artist_name, u.name AS client_name
    FROM bookings b
    JOIN artists a ON a.id = b.artist_id
    JOIN users u ON u.id = b.client_id
"#;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: String,
    pub client_id: String,
    pub artist_id: String,
    pub status: String,
    pub event_date: String,
    pub event_type: String,
    pub location: String,
    pub price: i64,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub artist_name: Option<String>,
    pub client_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Approved,
    Declined,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Targets an artist may pick through `PUT /api/bookings/:id`
    pub const ARTIST_SETTABLE: [BookingStatus; 3] = [
        BookingStatus::Approved,
        BookingStatus::Declined,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Declined => "DECLINED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(BookingStatus::Pending),
            "APPROVED" => Some(BookingStatus::Approved),
            "DECLINED" => Some(BookingStatus::Declined),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "COMPLETED" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    pub fn allowed_targets(&self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Approved, BookingStatus::Declined],
            BookingStatus::Approved => &[BookingStatus::Cancelled, BookingStatus::Completed],
            BookingStatus::Declined | BookingStatus::Cancelled | BookingStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        self.allowed_targets().contains(&next)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comma separated status names, `none` for an empty list
pub fn join_statuses(statuses: &[BookingStatus]) -> String {
    if statuses.is_empty() {
        return "none".to_string();
    }
    statuses
        .iter()
        .map(BookingStatus::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub artist_id: String,
    pub event_date: String,
    pub event_type: String,
    pub location: String,
    #[serde(default)]
    pub price: i64,
    pub notes: Option<String>,
}

/// `PUT /api/bookings/:id` body; the raw string is checked against the status set
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    #[serde(rename = "newStatus")]
    pub new_status: String,
}

/// Result of a status change
#[derive(Debug, Serialize, PartialEq)]
pub struct BookingStatusChange {
    pub id: String,
    pub status: BookingStatus,
    pub event_date: String,
}

/// `?status=&page=&limit=` on booking listings
#[derive(Debug, Default, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
