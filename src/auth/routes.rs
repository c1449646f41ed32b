//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /api/auth/signup`, `POST /api/auth/login` - password accounts
/// - `POST /api/auth/google` - Google ID-token login
/// - `POST /api/auth/otp/send`, `POST /api/auth/otp/verify` - phone verification
/// - `POST /api/auth/email/verify`, `POST /api/auth/email/resend` - email verification
/// - `POST /api/auth/password/forgot`, `POST /api/auth/password/reset` - password reset
/// - `POST /api/auth/logout` - Logout (client-side token removal)
/// - `GET /api/me`, `DELETE /api/me` - current account
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/google", post(handlers::google_auth))
        .route("/api/auth/otp/send", post(handlers::send_otp))
        .route("/api/auth/otp/verify", post(handlers::verify_otp))
        .route("/api/auth/email/verify", post(handlers::verify_email))
        .route("/api/auth/email/resend", post(handlers::resend_verification))
        .route("/api/auth/password/forgot", post(handlers::forgot_password))
        .route("/api/auth/password/reset", post(handlers::reset_password))
        .route("/api/auth/logout", post(handlers::logout_handler))
        .route(
            "/api/me",
            get(handlers::me_handler).delete(handlers::delete_me),
        )
}
