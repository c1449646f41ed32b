// src/admin/handlers/mod.rs

pub mod bookings;
pub mod dashboard;
pub mod users;
pub mod videos;
