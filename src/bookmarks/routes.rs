use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers;

pub fn bookmarks_routes() -> Router {
    Router::new()
        .route(
            "/api/bookmarks",
            get(handlers::list_bookmarks).post(handlers::create_bookmark),
        )
        .route("/api/bookmarks/:id", delete(handlers::delete_bookmark))
}
