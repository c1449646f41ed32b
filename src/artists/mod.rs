//! # Artists Module
//!
//! Artist profiles and the artist dashboard:
//! - Public directory with filters and approved videos on the detail page
//! - Own profile management (creating one promotes the account to artist)
//! - Dashboard bookings listing
//! - YouTube/Instagram connect, disconnect and sync endpoints

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::artists_routes;
