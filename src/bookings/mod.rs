//! # Bookings Module
//!
//! Client booking requests and the artist-driven status lifecycle
//! (PENDING → APPROVED/DECLINED, APPROVED → CANCELLED/COMPLETED).

pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use models::{Booking, BookingStatus};
pub use routes::bookings_routes;
