use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};

use super::handlers;
use super::validators::MAX_UPLOAD_BYTES;

/// Creates the videos router
///
/// Multipart overhead on top of the largest accepted file is allowed for.
pub fn videos_routes() -> Router {
    Router::new()
        .route(
            "/api/videos",
            get(handlers::list_videos)
                .post(handlers::upload_video)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024)),
        )
        .route(
            "/api/videos/:id",
            get(handlers::get_video).delete(handlers::delete_video),
        )
        .route("/api/me/videos", get(handlers::my_videos))
}
