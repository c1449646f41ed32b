//! # Bookmarks Module
//!
//! Saved artists and videos per user.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::bookmarks_routes;
