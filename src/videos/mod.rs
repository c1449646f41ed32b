//! # Videos Module
//!
//! Uploaded and synced videos:
//! - Public listing and detail of approved videos (moderation gate)
//! - Multipart upload to S3, held for admin approval
//! - Owner listing and deletion

pub mod handlers;
pub mod models;
pub mod moderation;
pub mod routes;
pub mod validators;


pub use models::Video;
pub use routes::videos_routes;
