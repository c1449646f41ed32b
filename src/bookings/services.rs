use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::models::{Booking, BookingStatus, CreateBookingRequest, BOOKING_SELECT};
use super::validators::BookingValidator;
use crate::auth::authz::{booking_access, Actor};
use crate::common::validation::parse_date;
use crate::common::{generate_booking_id, ApiError, Page, Paginated, Validator};

/// Whose bookings a listing returns
#[derive(Debug, Clone, Copy)]
pub enum BookingParty<'a> {
    Client(&'a str),
    Artist(&'a str),
}

fn push_filters(
    builder: &mut QueryBuilder<'_, Sqlite>,
    party: BookingParty<'_>,
    status: Option<BookingStatus>,
) {
    match party {
        BookingParty::Client(id) => builder.push(" WHERE b.client_id = ").push_bind(id.to_string()),
        BookingParty::Artist(id) => builder.push(" WHERE b.artist_id = ").push_bind(id.to_string()),
    };
    if let Some(status) = status {
        builder.push(" AND b.status = ").push_bind(status.as_str());
    }
}

pub struct BookingsService {
    db: SqlitePool,
}

impl BookingsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn fetch(&self, booking_id: &str) -> Result<Option<Booking>, ApiError> {
        let booking = sqlx::query_as::<_, Booking>(&format!("{} WHERE b.id = ?", BOOKING_SELECT))
            .bind(booking_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(booking)
    }

    /// New PENDING booking made by `client_id`
    pub async fn create(
        &self,
        client_id: &str,
        request: CreateBookingRequest,
    ) -> Result<Booking, ApiError> {
        BookingValidator {
            today: Utc::now().date_naive(),
        }
        .validate(&request)
        .into_result()?;

        let artist_user: Option<String> =
            sqlx::query_scalar("SELECT user_id FROM artists WHERE id = ?")
                .bind(&request.artist_id)
                .fetch_optional(&self.db)
                .await?;
        let artist_user = artist_user.ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))?;

        if artist_user == client_id {
            return Err(ApiError::BadRequest("You cannot book yourself".to_string()));
        }

        // Stored zero padded so listings order by date
        let event_date = parse_date(&request.event_date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .ok_or_else(|| ApiError::ValidationError("event_date must be a YYYY-MM-DD date".to_string()))?;

        let booking_id = generate_booking_id();
        sqlx::query(
            r#"
            INSERT INTO bookings (id, client_id, artist_id, status, event_date, event_type, location, price, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&booking_id)
        .bind(client_id)
        .bind(&request.artist_id)
        .bind(BookingStatus::Pending.as_str())
        .bind(&event_date)
        .bind(request.event_type.trim())
        .bind(request.location.trim())
        .bind(request.price)
        .bind(&request.notes)
        .execute(&self.db)
        .await?;

        info!(
            booking_id = %booking_id,
            client_id = %client_id,
            artist_id = %request.artist_id,
            event_date = %event_date,
            "Booking requested"
        );

        self.fetch(&booking_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("Booking vanished after insert".to_string()))
    }

    /// Detail for the booking's client or artist
    pub async fn get_for(&self, actor: &Actor, booking_id: &str) -> Result<Booking, ApiError> {
        let booking = self
            .fetch(booking_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Booking not found".to_string()))?;

        if !booking_access(actor, &booking.client_id, &booking.artist_id) {
            return Err(ApiError::Forbidden(
                "You do not have access to this booking".to_string(),
            ));
        }

        Ok(booking)
    }

    pub async fn list(
        &self,
        party: BookingParty<'_>,
        status: Option<&str>,
        page: Page,
    ) -> Result<Paginated<Booking>, ApiError> {
        let status = status
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                BookingStatus::parse(s)
                    .ok_or_else(|| ApiError::BadRequest(format!("Unknown booking status: {}", s)))
            })
            .transpose()?;

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM bookings b");
        push_filters(&mut count, party, status);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.db).await?;

        let mut query = QueryBuilder::<Sqlite>::new(BOOKING_SELECT);
        push_filters(&mut query, party, status);
        query
            .push(" ORDER BY b.event_date ASC, b.created_at DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let bookings = query.build_query_as::<Booking>().fetch_all(&self.db).await?;

        Ok(Paginated::new(bookings, total, page))
    }
}
