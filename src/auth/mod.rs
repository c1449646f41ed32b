//! # Auth Module
//!
//! Account authentication and authorization:
//! - Password signup/login (argon2) and Google ID-token login
//! - Phone OTP and email verification, password reset
//! - JWT issuing and the `AuthedUser` extractor for protected routes
//! - Ownership predicates shared by the booking, video and artist modules

pub mod authz;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod otp;
pub mod password;
pub mod routes;
pub mod validators;

#[cfg(test)]
mod tests;

pub use authz::Actor;
pub use extractors::AuthedUser;
pub use models::User;
pub use routes::auth_routes;
