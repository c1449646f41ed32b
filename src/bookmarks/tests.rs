//! Tests for bookmarks module

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::{
        extract::{Extension, Json, Path},
        http::StatusCode,
    };
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::auth::AuthedUser;
    use crate::common::migrations::fixtures;
    use crate::common::{ApiError, AppState};
    use models::CreateBookmarkRequest;

    async fn seeded_state() -> Arc<RwLock<AppState>> {
        let state = AppState::for_tests().await;
        fixtures::insert_artist(&state.db, "A_1", "U_ARTIST").await;
        fixtures::insert_user(&state.db, "U_FAN", "fan@test.com", "user").await;
        fixtures::insert_user(&state.db, "U_OTHER", "other@test.com", "user").await;
        fixtures::insert_video(&state.db, "V_OK", "U_ARTIST", "https://cdn.test/ok.mp4", true, true).await;
        fixtures::insert_video(&state.db, "V_PENDING", "U_ARTIST", "https://cdn.test/p.mp4", false, true).await;
        Arc::new(RwLock::new(state))
    }

    fn authed(id: &str) -> AuthedUser {
        AuthedUser {
            id: id.to_string(),
            email: format!("{}@test.com", id.to_lowercase()),
            role: "user".to_string(),
            is_admin: false,
        }
    }

    fn video(id: &str) -> CreateBookmarkRequest {
        CreateBookmarkRequest {
            artist_id: None,
            video_id: Some(id.to_string()),
        }
    }

    #[tokio::test]
    async fn test_duplicate_bookmark_conflicts() {
        let state = seeded_state().await;

        let (status, Json(saved)) =
            handlers::create_bookmark(Extension(state.clone()), authed("U_FAN"), Json(video("V_OK")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved.video_title.as_deref(), Some("Video V_OK"));

        let again =
            handlers::create_bookmark(Extension(state.clone()), authed("U_FAN"), Json(video("V_OK")))
                .await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));

        // Another user may save the same video
        handlers::create_bookmark(Extension(state.clone()), authed("U_OTHER"), Json(video("V_OK")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unapproved_video_cannot_be_bookmarked_or_listed() {
        let state = seeded_state().await;

        let pending =
            handlers::create_bookmark(Extension(state.clone()), authed("U_FAN"), Json(video("V_PENDING")))
                .await;
        assert!(matches!(pending, Err(ApiError::NotFound(_))));

        handlers::create_bookmark(Extension(state.clone()), authed("U_FAN"), Json(video("V_OK")))
            .await
            .unwrap();
        handlers::create_bookmark(
            Extension(state.clone()),
            authed("U_FAN"),
            Json(CreateBookmarkRequest {
                artist_id: Some("A_1".to_string()),
                video_id: None,
            }),
        )
        .await
        .unwrap();

        // Unpublishing the video hides its bookmark
        let db = state.read().await.db.clone();
        sqlx::query("UPDATE videos SET is_approved = 0 WHERE id = 'V_OK'")
            .execute(&db)
            .await
            .unwrap();

        let Json(listed) = handlers::list_bookmarks(Extension(state.clone()), authed("U_FAN"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].artist_id.as_deref(), Some("A_1"));
        assert_eq!(listed[0].stage_name.as_deref(), Some("Stage A_1"));
    }

    #[tokio::test]
    async fn test_delete_other_users_bookmark_is_not_found() {
        let state = seeded_state().await;

        let (_, Json(saved)) =
            handlers::create_bookmark(Extension(state.clone()), authed("U_FAN"), Json(video("V_OK")))
                .await
                .unwrap();

        let stolen =
            handlers::delete_bookmark(Extension(state.clone()), authed("U_OTHER"), Path(saved.id.clone()))
                .await;
        assert!(matches!(stolen, Err(ApiError::NotFound(_))));

        let status = handlers::delete_bookmark(Extension(state.clone()), authed("U_FAN"), Path(saved.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
