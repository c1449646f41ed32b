//! Tests for auth module
//!
//! Handlers are called directly against an in-memory database.

#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::{extract::Extension, http::StatusCode, Json};
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use crate::common::{ApiError, AppState};
    use handlers::GoogleIdentity;
    use models::*;

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

    async fn signup(state: &Arc<RwLock<AppState>>, email: &str, password: &str) -> AuthResponse {
        let (status, Json(resp)) = handlers::signup(
            Extension(state.clone()),
            Json(SignupRequest {
                email: email.to_string(),
                password: password.to_string(),
                name: Some("Asha".to_string()),
                role: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        resp
    }

    #[test]
    fn test_issued_jwt_decodes_with_same_secret_only() {
        let token = handlers::issue_jwt("U_TEST01", "test_secret").unwrap();
        let claims = extractors::decode_token(&token, "test_secret").unwrap();
        assert_eq!(claims.sub, "U_TEST01");
        assert!(extractors::decode_token(&token, "wrong_secret").is_err());
    }

    #[test]
    fn test_expired_jwt_is_rejected() {
        let claims = Claims {
            sub: "U_TEST01".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();
        assert!(matches!(
            extractors::decode_token(&token, "test_secret"),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let state = shared_state().await;
        let created = signup(&state, "Asha@Example.com", "supersecret").await;
        assert_eq!(created.user.email, "asha@example.com");
        assert_eq!(created.user.role, "user");
        assert!(!created.user.email_verified);

        let Json(logged_in) = handlers::login(
            Extension(state.clone()),
            Json(LoginRequest {
                email: "asha@example.com".to_string(),
                password: "supersecret".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(logged_in.user.id, created.user.id);

        let wrong = handlers::login(
            Extension(state.clone()),
            Json(LoginRequest {
                email: "asha@example.com".to_string(),
                password: "not-the-password".to_string(),
            }),
        )
        .await;
        assert!(matches!(wrong, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_duplicate_signup_conflicts() {
        let state = shared_state().await;
        signup(&state, "asha@example.com", "supersecret").await;

        let again = handlers::signup(
            Extension(state.clone()),
            Json(SignupRequest {
                email: "ASHA@example.com".to_string(),
                password: "anothersecret".to_string(),
                name: None,
                role: Some(Role::Artist),
            }),
        )
        .await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_signup_cannot_claim_admin() {
        let state = shared_state().await;
        let result = handlers::signup(
            Extension(state.clone()),
            Json(SignupRequest {
                email: "sneaky@example.com".to_string(),
                password: "supersecret".to_string(),
                name: None,
                role: Some(Role::Admin),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_email_verification_link() {
        let state = shared_state().await;
        let created = signup(&state, "asha@example.com", "supersecret").await;
        let pool = db(&state).await;

        let token: String = sqlx::query_scalar(
            "SELECT token FROM verification_tokens WHERE identifier = 'asha@example.com'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        handlers::verify_email(
            Extension(state.clone()),
            Json(VerifyEmailRequest { token: token.clone() }),
        )
        .await
        .unwrap();

        let verified: bool = sqlx::query_scalar("SELECT email_verified FROM users WHERE id = ?")
            .bind(&created.user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(verified);

        // Single use
        let reused =
            handlers::verify_email(Extension(state.clone()), Json(VerifyEmailRequest { token })).await;
        assert!(matches!(reused, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_password_reset_flow() {
        let state = shared_state().await;
        signup(&state, "asha@example.com", "supersecret").await;
        let pool = db(&state).await;

        // Unknown emails get the same answer
        handlers::forgot_password(
            Extension(state.clone()),
            Json(ForgotPasswordRequest {
                email: "nobody@example.com".to_string(),
            }),
        )
        .await
        .unwrap();

        handlers::forgot_password(
            Extension(state.clone()),
            Json(ForgotPasswordRequest {
                email: "asha@example.com".to_string(),
            }),
        )
        .await
        .unwrap();

        let token: String =
            sqlx::query_scalar("SELECT reset_token FROM users WHERE email = 'asha@example.com'")
                .fetch_one(&pool)
                .await
                .unwrap();

        handlers::reset_password(
            Extension(state.clone()),
            Json(ResetPasswordRequest {
                token: token.clone(),
                password: "brand-new-secret".to_string(),
            }),
        )
        .await
        .unwrap();

        handlers::login(
            Extension(state.clone()),
            Json(LoginRequest {
                email: "asha@example.com".to_string(),
                password: "brand-new-secret".to_string(),
            }),
        )
        .await
        .unwrap();

        let reused = handlers::reset_password(
            Extension(state.clone()),
            Json(ResetPasswordRequest {
                token,
                password: "yet-another-secret".to_string(),
            }),
        )
        .await;
        assert!(matches!(reused, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_expired_reset_token_is_rejected() {
        let state = shared_state().await;
        signup(&state, "asha@example.com", "supersecret").await;
        let pool = db(&state).await;

        sqlx::query("UPDATE users SET reset_token = 'stale', reset_token_expiry = ?")
            .bind((Utc::now() - Duration::minutes(1)).to_rfc3339())
            .execute(&pool)
            .await
            .unwrap();

        let result = handlers::reset_password(
            Extension(state.clone()),
            Json(ResetPasswordRequest {
                token: "stale".to_string(),
                password: "brand-new-secret".to_string(),
            }),
        )
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_otp_send_fails_with_fixed_message_without_sms_provider() {
        let state = shared_state().await;
        let result = handlers::send_otp(
            Extension(state.clone()),
            authed("U_1"),
            Json(SendOtpRequest {
                phone: "+919876543210".to_string(),
            }),
        )
        .await;

        match result {
            Err(ApiError::InternalServer(msg)) => assert_eq!(msg, "Failed to send verification SMS"),
            other => panic!("unexpected result: {:?}", other.map(|j| j.0)),
        }
    }

    #[tokio::test]
    async fn test_otp_round_trip_in_dev_mode() {
        let mut app_state = AppState::for_tests().await;
        app_state.dev_mode.enabled = true;
        let pool = app_state.db.clone();
        let state = Arc::new(RwLock::new(app_state));

        crate::common::migrations::fixtures::insert_user(&pool, "U_1", "u_1@test.com", "user").await;

        handlers::send_otp(
            Extension(state.clone()),
            authed("U_1"),
            Json(SendOtpRequest {
                phone: "+919876543210".to_string(),
            }),
        )
        .await
        .unwrap();

        let code: String = sqlx::query_scalar(
            "SELECT token FROM verification_tokens WHERE identifier = '+919876543210'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let wrong_code = if code == "000000" { "111111" } else { "000000" };
        let wrong = handlers::verify_otp(
            Extension(state.clone()),
            authed("U_1"),
            Json(VerifyOtpRequest {
                phone: "+919876543210".to_string(),
                code: wrong_code.to_string(),
            }),
        )
        .await;
        assert!(matches!(wrong, Err(ApiError::BadRequest(_))));

        handlers::verify_otp(
            Extension(state.clone()),
            authed("U_1"),
            Json(VerifyOtpRequest {
                phone: "+919876543210".to_string(),
                code,
            }),
        )
        .await
        .unwrap();

        let (phone, verified): (Option<String>, bool) =
            sqlx::query_as("SELECT phone, phone_verified FROM users WHERE id = 'U_1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(phone.as_deref(), Some("+919876543210"));
        assert!(verified);
    }

    #[tokio::test]
    async fn test_otp_guessing_burns_the_code() {
        let mut app_state = AppState::for_tests().await;
        app_state.dev_mode.enabled = true;
        let pool = app_state.db.clone();
        let state = Arc::new(RwLock::new(app_state));
        let phone = "+919876543210";

        crate::common::migrations::fixtures::insert_user(&pool, "U_1", "u_1@test.com", "user").await;

        handlers::send_otp(
            Extension(state.clone()),
            authed("U_1"),
            Json(SendOtpRequest {
                phone: phone.to_string(),
            }),
        )
        .await
        .unwrap();

        let code: String = sqlx::query_scalar("SELECT token FROM verification_tokens WHERE identifier = ?")
            .bind(phone)
            .fetch_one(&pool)
            .await
            .unwrap();

        let wrong_codes = ["000000", "111111", "222222", "333333", "444444", "555555"]
            .into_iter()
            .filter(|c| *c != code)
            .take(otp::MAX_OTP_ATTEMPTS as usize);
        for wrong in wrong_codes {
            let result = handlers::verify_otp(
                Extension(state.clone()),
                authed("U_1"),
                Json(VerifyOtpRequest {
                    phone: phone.to_string(),
                    code: wrong.to_string(),
                }),
            )
            .await;
            assert!(matches!(result, Err(ApiError::BadRequest(_))));
        }

        let late = handlers::verify_otp(
            Extension(state.clone()),
            authed("U_1"),
            Json(VerifyOtpRequest {
                phone: phone.to_string(),
                code,
            }),
        )
        .await;
        assert!(matches!(late, Err(ApiError::BadRequest(_))));

        let verified: bool = sqlx::query_scalar("SELECT phone_verified FROM users WHERE id = 'U_1'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(!verified);
    }

    #[test]
    fn test_google_tokeninfo_checks() {
        let now = 1_700_000_000;
        let body = serde_json::json!({
            "sub": "1234567890",
            "email": "Artist@Gmail.com",
            "email_verified": "true",
            "aud": "client-1",
            "exp": (now + 600).to_string(),
            "name": "Asha",
        });

        let identity = GoogleIdentity::from_tokeninfo(&body, Some("client-1"), now).unwrap();
        assert_eq!(identity.email, "artist@gmail.com");
        assert!(identity.email_verified);

        assert!(matches!(
            GoogleIdentity::from_tokeninfo(&body, Some("other-client"), now),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            GoogleIdentity::from_tokeninfo(&body, Some("client-1"), now + 3600),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            GoogleIdentity::from_tokeninfo(&serde_json::json!({"sub": "1"}), None, now),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_google_login_links_existing_password_account() {
        let state = shared_state().await;
        let created = signup(&state, "asha@example.com", "supersecret").await;
        let app_state = state.read().await.clone();

        let identity = GoogleIdentity {
            sub: "google-sub-1".to_string(),
            email: "asha@example.com".to_string(),
            email_verified: true,
            name: None,
            picture: Some("https://lh3.googleusercontent.com/a/pic".to_string()),
        };

        let linked = handlers::upsert_google_user(&app_state, &identity).await.unwrap();
        assert_eq!(linked.id, created.user.id);
        assert!(linked.email_verified);

        // Second login resolves by subject
        let again = handlers::upsert_google_user(&app_state, &identity).await.unwrap();
        assert_eq!(again.id, created.user.id);
    }

    #[tokio::test]
    async fn test_delete_me_cascades() {
        let state = shared_state().await;
        let pool = db(&state).await;
        crate::common::migrations::fixtures::insert_artist(&pool, "A_1", "U_1").await;
        crate::common::migrations::fixtures::insert_video(&pool, "V_1", "U_1", "https://cdn/v1", true, true)
            .await;

        let status = handlers::delete_me(Extension(state.clone()), authed("U_1"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let videos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(videos, 0);
    }
}
