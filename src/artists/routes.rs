use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates the artists router
///
/// # Routes
/// - `GET /api/artists`, `GET /api/artists/:id` - public directory
/// - `GET/POST/PUT /api/artists/profile` - own profile
/// - `GET /api/artists/dashboard/bookings` - bookings made with the artist
/// - `/api/artists/integrations/...` - YouTube and Instagram connections
pub fn artists_routes() -> Router {
    Router::new()
        .route("/api/artists", get(handlers::list_artists))
        .route(
            "/api/artists/profile",
            get(handlers::get_my_profile)
                .post(handlers::create_my_profile)
                .put(handlers::update_my_profile),
        )
        .route("/api/artists/dashboard/bookings", get(handlers::dashboard_bookings))
        .route("/api/artists/integrations", get(handlers::integration_status))
        .route(
            "/api/artists/integrations/:provider/connect",
            get(handlers::connect_integration),
        )
        .route(
            "/api/artists/integrations/:provider/callback",
            get(handlers::integration_callback),
        )
        .route(
            "/api/artists/integrations/:provider/disconnect",
            post(handlers::disconnect_integration),
        )
        .route(
            "/api/artists/integrations/:provider/sync",
            post(handlers::sync_integration),
        )
        .route("/api/artists/:id", get(handlers::get_artist))
}
