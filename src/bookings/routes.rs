use axum::{routing::get, Router};

use super::handlers;

/// Creates the bookings router
///
/// # Routes
/// - `POST /api/bookings`, `GET /api/bookings` - client side
/// - `GET /api/bookings/:id` - client or artist
/// - `PUT /api/bookings/:id` - artist status change
pub fn bookings_routes() -> Router {
    Router::new()
        .route(
            "/api/bookings",
            get(handlers::list_my_bookings).post(handlers::create_booking),
        )
        .route(
            "/api/bookings/:id",
            get(handlers::get_booking).put(handlers::update_booking_status),
        )
}
