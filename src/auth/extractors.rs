//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::models::{Claims, User};
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Validates the bearer JWT and loads the account so that deleted users are
/// rejected even while their token is still unexpired. Admin status comes
/// from the stored role or the ADMIN_EMAILS allow-list.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
}

impl AuthedUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin {
            Ok(())
        } else {
            warn!(user_id = %self.id, "Admin privileges required");
            Err(ApiError::Forbidden("Admin privileges required".to_string()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        // DEV MODE: Bypass authentication completely
        if app_state.dev_mode.is_enabled() {
            let dev_user = app_state.dev_mode.create_dev_user();
            let is_admin = app_state.is_admin(&dev_user.email, &dev_user.role);

            debug!(
                user_id = %dev_user.id,
                email = %safe_email_log(&dev_user.email),
                is_admin = is_admin,
                "DEV MODE: Authentication bypassed"
            );

            return Ok(AuthedUser {
                id: dev_user.id,
                email: dev_user.email,
                role: dev_user.role,
                is_admin,
            });
        }

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("Authentication failed: missing Authorization header");
                ApiError::Unauthorized("missing auth".into())
            })?;

        let bare_token = header.strip_prefix("Bearer ").unwrap_or(header);

        let claims = decode_token(bare_token, &app_state.jwt_secret)?;
        let user_id = claims.sub;

        let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_optional(&app_state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    user_id = %user_id,
                    "Database error during user lookup in authentication"
                );
                ApiError::DatabaseError(e)
            })?;

        match user {
            Some(u) => {
                let is_admin = app_state.is_admin(&u.email, &u.role);
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    role = %u.role,
                    is_admin = is_admin,
                    "User authenticated via extractor"
                );
                Ok(AuthedUser {
                    id: u.id,
                    email: u.email,
                    role: u.role,
                    is_admin,
                })
            }
            None => {
                warn!(user_id = %user_id, "Authentication failed: user not found in database");
                Err(ApiError::Unauthorized("user not found".into()))
            }
        }
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!(error = %e, "JWT token validation failed");
        ApiError::Unauthorized("invalid token".into())
    })
}
