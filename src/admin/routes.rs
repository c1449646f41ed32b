// src/admin/routes.rs

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::handlers;

pub fn admin_routes() -> Router {
    Router::new()
        .route(
            "/api/admin/dashboard/metrics",
            get(handlers::dashboard::get_dashboard_metrics),
        )
        .route("/api/admin/users", get(handlers::users::list_users))
        // Moderation
        .route("/api/admin/videos", get(handlers::videos::list_videos))
        .route(
            "/api/admin/videos/:id/approval",
            patch(handlers::videos::set_video_approval),
        )
        .route(
            "/api/admin/bookings/:id/complete",
            post(handlers::bookings::complete_booking),
        )
}
