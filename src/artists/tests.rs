//! Tests for artists module

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::{
        extract::{Extension, Json, Path, Query},
        http::header::LOCATION,
        response::IntoResponse,
    };
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::auth::AuthedUser;
    use crate::common::migrations::fixtures;
    use crate::common::{ApiError, AppState};
    use crate::integrations::connect::CallbackParams;
    use models::*;
    use services::ArtistsService;

    async fn shared_state() -> Arc<RwLock<AppState>> {
        Arc::new(RwLock::new(AppState::for_tests().await))
    }

    async fn db(state: &Arc<RwLock<AppState>>) -> sqlx::SqlitePool {
        state.read().await.db.clone()
    }

    fn authed(id: &str) -> AuthedUser {
        AuthedUser {
            id: id.to_string(),
            email: format!("{}@test.com", id.to_lowercase()),
            role: "user".to_string(),
            is_admin: false,
        }
    }

    fn profile_request(stage_name: &str) -> CreateArtistProfileRequest {
        CreateArtistProfileRequest {
            stage_name: stage_name.to_string(),
            artist_type: "DJ".to_string(),
            bio: Some("Bollywood and house sets".to_string()),
            location: Some("Bengaluru".to_string()),
            languages: vec!["Kannada".to_string(), "English".to_string()],
            price_min: Some(20000),
            price_max: Some(80000),
        }
    }

    #[tokio::test]
    async fn test_create_profile_promotes_user_and_rejects_duplicate() {
        let state = shared_state().await;
        let pool = db(&state).await;
        fixtures::insert_user(&pool, "U_1", "u_1@test.com", "user").await;

        let (status, Json(artist)) = handlers::create_my_profile(
            Extension(state.clone()),
            authed("U_1"),
            Json(profile_request("DJ Nila")),
        )
        .await
        .unwrap();
        assert_eq!(status, axum::http::StatusCode::CREATED);
        assert_eq!(artist.stage_name, "DJ Nila");

        let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = 'U_1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(role, "artist");

        let again = handlers::create_my_profile(
            Extension(state.clone()),
            authed("U_1"),
            Json(profile_request("DJ Nila Again")),
        )
        .await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_languages_serialize_as_list() {
        let pool = crate::common::migrations::test_pool().await;
        fixtures::insert_artist(&pool, "A_1", "U_1").await;

        let artist = ArtistsService::new(pool).get("A_1").await.unwrap();
        let value = serde_json::to_value(&artist).unwrap();
        assert_eq!(value["languages"], serde_json::json!(["Hindi"]));
        assert!(value.get("youtube_access_token").is_none());
    }

    #[tokio::test]
    async fn test_update_checks_merged_price_range() {
        let pool = crate::common::migrations::test_pool().await;
        fixtures::insert_user(&pool, "U_1", "u_1@test.com", "user").await;
        let service = ArtistsService::new(pool);
        service.create("U_1", profile_request("Tabla Trio")).await.unwrap();

        let inverted = service
            .update(
                "U_1",
                UpdateArtistProfileRequest {
                    price_min: Some(90000),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(inverted, Err(ApiError::ValidationError(_))));

        let updated = service
            .update(
                "U_1",
                UpdateArtistProfileRequest {
                    location: Some("Pune".to_string()),
                    languages: Some(vec!["Marathi".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.location.as_deref(), Some("Pune"));
        assert_eq!(updated.price_min, Some(20000));
        assert_eq!(updated.languages.as_deref(), Some(r#"["Marathi"]"#));

        let missing = service
            .update("U_NOBODY", UpdateArtistProfileRequest::default())
            .await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_directory_filters() {
        let pool = crate::common::migrations::test_pool().await;
        for (user, stage, artist_type, languages, min, max) in [
            ("U_1", "Qawwali Nights", "singer", vec!["Urdu", "Hindi"], 30000, 60000),
            ("U_2", "Beat Theory", "DJ", vec!["English"], 10000, 25000),
            ("U_3", "Folk Roots", "band", vec!["Hindi"], 70000, 150000),
        ] {
            fixtures::insert_user(&pool, user, &format!("{}@test.com", user), "user").await;
            let mut request = profile_request(stage);
            request.artist_type = artist_type.to_string();
            request.languages = languages.into_iter().map(str::to_string).collect();
            request.price_min = Some(min);
            request.price_max = Some(max);
            ArtistsService::new(pool.clone()).create(user, request).await.unwrap();
        }
        let service = ArtistsService::new(pool);

        let hindi = service
            .list(&ArtistListQuery {
                language: Some("Hindi".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hindi.total, 2);

        let affordable = service
            .list(&ArtistListQuery {
                max_price: Some(40000),
                ..Default::default()
            })
            .await
            .unwrap();
        let names: Vec<&str> = affordable.items.iter().map(|a| a.stage_name.as_str()).collect();
        assert_eq!(names.len(), 2);
        assert!(!names.contains(&"Folk Roots"));

        let djs = service
            .list(&ArtistListQuery {
                artist_type: Some("dj".to_string()),
                q: Some("beat".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(djs.total, 1);
    }

    #[tokio::test]
    async fn test_artist_detail_shows_approved_videos_only() {
        let state = shared_state().await;
        let pool = db(&state).await;
        fixtures::insert_artist(&pool, "A_1", "U_1").await;
        fixtures::insert_video(&pool, "V_1", "U_1", "https://cdn.test/1.mp4", true, true).await;
        fixtures::insert_video(&pool, "V_2", "U_1", "https://cdn.test/2.mp4", false, true).await;

        let Json(detail) = handlers::get_artist(Extension(state.clone()), Path("A_1".to_string()))
            .await
            .unwrap();
        let ids: Vec<&str> = detail.videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["V_1"]);

        let missing = handlers::get_artist(Extension(state.clone()), Path("A_404".to_string())).await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_dashboard_requires_artist_profile() {
        let state = shared_state().await;
        let pool = db(&state).await;
        fixtures::insert_user(&pool, "U_FAN", "fan@test.com", "user").await;

        let result = handlers::dashboard_bookings(
            Extension(state.clone()),
            authed("U_FAN"),
            Query(Default::default()),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_integration_endpoints_without_configured_providers() {
        let state = shared_state().await;
        let pool = db(&state).await;
        fixtures::insert_artist(&pool, "A_1", "U_1").await;

        let Json(status) = handlers::integration_status(Extension(state.clone()), authed("U_1"))
            .await
            .unwrap();
        assert!(!status.youtube.connected && !status.instagram.connected);

        let connect = handlers::connect_integration(
            Extension(state.clone()),
            authed("U_1"),
            Path("youtube".to_string()),
        )
        .await;
        assert!(matches!(connect, Err(ApiError::ServiceUnavailable(_))));

        let unknown = handlers::connect_integration(
            Extension(state.clone()),
            authed("U_1"),
            Path("tiktok".to_string()),
        )
        .await;
        assert!(matches!(unknown, Err(ApiError::NotFound(_))));

        let redirect = handlers::integration_callback(
            Extension(state.clone()),
            Path("instagram".to_string()),
            Query(CallbackParams::default()),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(
            redirect.headers()[LOCATION],
            "http://localhost:3000/artist/dashboard/integrations?error=connection_failed"
        );
    }
}
