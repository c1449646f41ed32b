//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::authz::artist_id_for_user;
use super::extractors::AuthedUser;
use super::models::*;
use super::otp::{self, TokenPurpose};
use super::password::{hash_password, verify_password};
use super::validators::{CredentialsValidator, OtpValidator};
use crate::common::helpers::safe_phone_log;
use crate::common::{generate_user_id, safe_email_log, ApiError, AppState, Validator};
use crate::services::email;

pub const JWT_TTL_HOURS: i64 = 24;

pub fn issue_jwt(user_id: &str, secret: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(JWT_TTL_HOURS)).timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        error!(error = %e, user_id = %user_id, "JWT encoding error during authentication");
        ApiError::InternalServer("jwt error".to_string())
    })
}

fn auth_response(state: &AppState, user: &User) -> Result<AuthResponse, ApiError> {
    Ok(AuthResponse {
        token: issue_jwt(&user.id, &state.jwt_secret)?,
        user: UserSummary::from_user(user, state.is_admin(&user.email, &user.role)),
    })
}

async fn find_user_by_email(state: &AppState, email: &str) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&state.db)
        .await?;
    Ok(user)
}

async fn fetch_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Account emails never fail the request; without SES the link is logged in dev mode
async fn send_account_email(state: &AppState, to: &str, subject: &str, html: &str, link: &str) {
    if !state.aws_service.is_configured() {
        if state.dev_mode.is_enabled() {
            info!(to = %safe_email_log(to), link = %link, "DEV MODE: email not sent");
        } else {
            warn!(to = %safe_email_log(to), subject = %subject, "Email service not configured, skipping");
        }
        return;
    }

    if let Err(e) = state.aws_service.send_email(to, subject, html).await {
        error!(error = %e, to = %safe_email_log(to), subject = %subject, "Failed to send account email");
    }
}

async fn send_verification_email(state: &AppState, user: &User, now: DateTime<Utc>) -> Result<(), ApiError> {
    let token = otp::generate_link_token();
    otp::issue(
        &state.db,
        &user.email,
        TokenPurpose::EmailVerification,
        &token,
        Duration::hours(otp::EMAIL_TOKEN_TTL_HOURS),
        now,
    )
    .await?;

    let link = format!(
        "{}/verify-email?token={}",
        state.config.frontend_url.trim_end_matches('/'),
        token
    );
    let html = email::verification_email(user.name.as_deref(), &link);
    send_account_email(state, &user.email, "Verify your AndAction email", &html, &link).await;
    Ok(())
}

/// POST /api/auth/signup
pub async fn signup(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    CredentialsValidator.validate(&payload).into_result()?;

    let email = payload.email.trim().to_lowercase();
    if find_user_by_email(&state, &email).await?.is_some() {
        warn!(email = %safe_email_log(&email), "Signup rejected: email already registered");
        return Err(ApiError::Conflict("An account with this email already exists".to_string()));
    }

    let id = generate_user_id();
    let role = payload.role.unwrap_or(Role::User);
    let password_hash = hash_password(&payload.password).await?;

    sqlx::query(
        "INSERT INTO users (id, email, name, role, password_hash, provider) VALUES (?, ?, ?, ?, ?, 'credentials')",
    )
    .bind(&id)
    .bind(&email)
    .bind(payload.name.as_deref().map(str::trim))
    .bind(role.as_str())
    .bind(&password_hash)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, email = %safe_email_log(&email), "Database error creating user");
        ApiError::DatabaseError(e)
    })?;

    let user = fetch_user(&state, &id).await?;
    send_verification_email(&state, &user, Utc::now()).await?;

    info!(user_id = %id, email = %safe_email_log(&email), role = role.as_str(), "User signed up");
    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

/// POST /api/auth/login
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    CredentialsValidator.validate(&payload).into_result()?;

    let email = payload.email.trim().to_lowercase();
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = find_user_by_email(&state, &email).await?.ok_or_else(|| {
        debug!(email = %safe_email_log(&email), "Login failed: unknown email");
        invalid()
    })?;

    // Google-provisioned accounts have no password until they reset one
    let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
    if !verify_password(&payload.password, hash).await {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    info!(user_id = %user.id, "User logged in with password");
    Ok(Json(auth_response(&state, &user)?))
}

/// POST /api/auth/google
/// Authenticates a user via Google OAuth ID token
pub async fn google_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<GoogleIdTokenPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("🔐 Received Google auth request");
    let state = state_lock.read().await.clone();

    // Docs: https://developers.google.com/identity/sign-in/web/backend-auth
    let resp = state
        .http
        .get("https://oauth2.googleapis.com/tokeninfo")
        .query(&[("id_token", payload.id_token.as_str())])
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, "HTTP error contacting Google tokeninfo endpoint");
            ApiError::InternalServer("google token validation service unavailable".to_string())
        })?;

    let status = resp.status();
    if !status.is_success() {
        warn!(http_status = %status, "Google tokeninfo rejected the id_token");
        return Err(match status.as_u16() {
            401 => ApiError::Unauthorized("expired or invalid id_token".to_string()),
            _ => ApiError::BadRequest("invalid or malformed id_token".to_string()),
        });
    }

    let body: serde_json::Value = resp.json().await.map_err(|e| {
        error!(error = %e, "Failed to parse Google tokeninfo JSON response");
        ApiError::BadRequest("malformed id_token".to_string())
    })?;

    let identity = GoogleIdentity::from_tokeninfo(
        &body,
        state.config.google.as_ref().map(|g| g.client_id.as_str()),
        Utc::now().timestamp(),
    )?;

    let user = upsert_google_user(&state, &identity).await?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );
    Ok(Json(auth_response(&state, &user)?))
}

/// Fields taken from a verified Google ID token
#[derive(Debug, PartialEq)]
pub struct GoogleIdentity {
    pub sub: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl GoogleIdentity {
    pub fn from_tokeninfo(
        body: &serde_json::Value,
        expected_audience: Option<&str>,
        now_ts: i64,
    ) -> Result<Self, ApiError> {
        let text = |key: &str| body.get(key).and_then(|v| v.as_str()).map(str::to_string);

        let (Some(email), Some(sub)) = (text("email"), text("sub")) else {
            warn!("Google token missing required fields (email/sub)");
            return Err(ApiError::BadRequest("token missing required fields".to_string()));
        };

        // tokeninfo returns numbers as strings
        let exp = body.get("exp").and_then(|v| {
            v.as_i64().or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        });
        if let Some(exp) = exp {
            if exp < now_ts {
                warn!(token_exp = exp, "Google token has expired");
                return Err(ApiError::Unauthorized("token has expired".to_string()));
            }
        }

        if let Some(client_id) = expected_audience {
            match body.get("aud").and_then(|v| v.as_str()) {
                Some(aud) if aud == client_id => {}
                Some(aud) => {
                    warn!(token_audience = %aud, "Google token audience mismatch");
                    return Err(ApiError::Unauthorized("token audience mismatch".to_string()));
                }
                None => {
                    return Err(ApiError::Unauthorized("token missing audience".to_string()));
                }
            }
        }

        let email_verified = body
            .get("email_verified")
            .map(|v| v.as_bool().unwrap_or_else(|| v.as_str() == Some("true")))
            .unwrap_or(false);

        Ok(Self {
            sub,
            email: email.to_lowercase(),
            email_verified,
            name: text("name"),
            picture: text("picture"),
        })
    }
}

/// Finds the account by Google subject, then by email (linking it), else provisions one
pub async fn upsert_google_user(state: &AppState, identity: &GoogleIdentity) -> Result<User, ApiError> {
    let by_subject = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE provider = 'google' AND provider_id = ?",
    )
    .bind(&identity.sub)
    .fetch_optional(&state.db)
    .await?;

    if let Some(user) = by_subject {
        return Ok(user);
    }

    if let Some(existing) = find_user_by_email(state, &identity.email).await? {
        if !identity.email_verified {
            warn!(user_id = %existing.id, "Refusing to link Google account with unverified email");
            return Err(ApiError::Unauthorized("Google email is not verified".to_string()));
        }

        sqlx::query(
            "UPDATE users SET provider = 'google', provider_id = ?, email_verified = 1, avatar = COALESCE(avatar, ?) WHERE id = ?",
        )
        .bind(&identity.sub)
        .bind(identity.picture.as_deref())
        .bind(&existing.id)
        .execute(&state.db)
        .await?;

        info!(user_id = %existing.id, "Linked existing account to Google");
        return fetch_user(state, &existing.id).await;
    }

    let id = generate_user_id();
    sqlx::query(
        "INSERT INTO users (id, email, name, avatar, role, provider, provider_id, email_verified) VALUES (?, ?, ?, ?, 'user', 'google', ?, ?)",
    )
    .bind(&id)
    .bind(&identity.email)
    .bind(identity.name.as_deref())
    .bind(identity.picture.as_deref())
    .bind(&identity.sub)
    .bind(identity.email_verified)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, email = %safe_email_log(&identity.email), "Database error inserting Google user");
        ApiError::DatabaseError(e)
    })?;

    info!(user_id = %id, email = %safe_email_log(&identity.email), "Created account via Google OAuth");
    fetch_user(state, &id).await
}

/// POST /api/auth/otp/send
pub async fn send_otp(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<SendOtpRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    OtpValidator.validate(&payload).into_result()?;

    let code = otp::generate_otp_code();
    otp::issue(
        &state.db,
        &payload.phone,
        TokenPurpose::PhoneOtp,
        &code,
        Duration::minutes(otp::OTP_TTL_MINUTES),
        Utc::now(),
    )
    .await?;

    let message = format!(
        "Your AndAction verification code is {}. It expires in {} minutes.",
        code,
        otp::OTP_TTL_MINUTES
    );
    let sms_failed = || ApiError::InternalServer("Failed to send verification SMS".to_string());

    if !state.sms_service.is_configured() {
        if state.dev_mode.is_enabled() {
            info!(phone = %safe_phone_log(&payload.phone), code = %code, "DEV MODE: SMS not sent");
        } else {
            error!("SMS provider not configured, cannot send OTP");
            return Err(sms_failed());
        }
    } else {
        let delivery = state
            .sms_service
            .send(&payload.phone, &message)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %authed.id, "OTP SMS request failed");
                sms_failed()
            })?;
        if !delivery.success {
            return Err(sms_failed());
        }
    }

    info!(user_id = %authed.id, phone = %safe_phone_log(&payload.phone), "OTP sent");
    Ok(Json(serde_json::json!({
        "message": "Verification code sent",
        "expires_in_minutes": otp::OTP_TTL_MINUTES,
    })))
}

/// POST /api/auth/otp/verify
pub async fn verify_otp(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    OtpValidator.validate(&payload).into_result()?;

    let consumed = otp::consume(
        &state.db,
        Some(&payload.phone),
        TokenPurpose::PhoneOtp,
        &payload.code,
        Utc::now(),
    )
    .await?;

    if consumed.is_none() {
        warn!(user_id = %authed.id, "OTP verification failed");
        return Err(ApiError::BadRequest("Invalid or expired code".to_string()));
    }

    sqlx::query("UPDATE users SET phone = ?, phone_verified = 1 WHERE id = ?")
        .bind(&payload.phone)
        .bind(&authed.id)
        .execute(&state.db)
        .await?;

    info!(user_id = %authed.id, phone = %safe_phone_log(&payload.phone), "Phone verified");
    Ok(Json(serde_json::json!({ "message": "Phone verified", "phone_verified": true })))
}

/// POST /api/auth/email/verify
pub async fn verify_email(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let email = otp::consume(
        &state.db,
        None,
        TokenPurpose::EmailVerification,
        payload.token.trim(),
        Utc::now(),
    )
    .await?
    .ok_or_else(|| ApiError::BadRequest("Invalid or expired verification link".to_string()))?;

    sqlx::query("UPDATE users SET email_verified = 1 WHERE email = ?")
        .bind(&email)
        .execute(&state.db)
        .await?;

    info!(email = %safe_email_log(&email), "Email verified");
    Ok(Json(serde_json::json!({ "message": "Email verified", "email_verified": true })))
}

/// POST /api/auth/email/resend
pub async fn resend_verification(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let user = fetch_user(&state, &authed.id).await?;

    if user.email_verified {
        return Err(ApiError::BadRequest("Email is already verified".to_string()));
    }

    send_verification_email(&state, &user, Utc::now()).await?;
    Ok(Json(serde_json::json!({ "message": "Verification email sent" })))
}

/// POST /api/auth/password/forgot
/// Responds identically whether or not the email is registered.
pub async fn forgot_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();
    let email = payload.email.trim().to_lowercase();

    if let Some(user) = find_user_by_email(&state, &email).await? {
        let token = otp::generate_link_token();
        let expiry = Utc::now() + Duration::hours(otp::RESET_TOKEN_TTL_HOURS);

        sqlx::query("UPDATE users SET reset_token = ?, reset_token_expiry = ? WHERE id = ?")
            .bind(&token)
            .bind(expiry.to_rfc3339())
            .bind(&user.id)
            .execute(&state.db)
            .await?;

        let link = format!(
            "{}/reset-password?token={}",
            state.config.frontend_url.trim_end_matches('/'),
            token
        );
        let html = email::password_reset_email(user.name.as_deref(), &link);
        send_account_email(&state, &user.email, "Reset your AndAction password", &html, &link).await;
        info!(user_id = %user.id, "Password reset issued");
    } else {
        debug!(email = %safe_email_log(&email), "Password reset requested for unknown email");
    }

    Ok(Json(serde_json::json!({
        "message": "If that email is registered, a reset link has been sent"
    })))
}

/// POST /api/auth/password/reset
pub async fn reset_password(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    CredentialsValidator.validate(&payload).into_result()?;

    let invalid = || ApiError::BadRequest("Invalid or expired reset token".to_string());

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_token = ?")
        .bind(payload.token.trim())
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(invalid)?;

    let unexpired = user
        .reset_token_expiry
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|exp| exp.with_timezone(&Utc) > Utc::now())
        .unwrap_or(false);

    if !unexpired {
        sqlx::query("UPDATE users SET reset_token = NULL, reset_token_expiry = NULL WHERE id = ?")
            .bind(&user.id)
            .execute(&state.db)
            .await?;
        return Err(invalid());
    }

    let password_hash = hash_password(&payload.password).await?;
    sqlx::query(
        "UPDATE users SET password_hash = ?, reset_token = NULL, reset_token_expiry = NULL WHERE id = ?",
    )
    .bind(&password_hash)
    .bind(&user.id)
    .execute(&state.db)
    .await?;

    info!(user_id = %user.id, "Password reset completed");
    Ok(Json(serde_json::json!({ "message": "Password updated" })))
}

/// GET /api/me
#[axum::debug_handler]
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = if state.dev_mode.is_enabled() {
        state.dev_mode.create_dev_user()
    } else {
        fetch_user(&state, &authed.id).await?
    };
    let artist_id = artist_id_for_user(&state.db, &authed.id).await?;

    Ok(Json(serde_json::json!({
        "user": user,
        "is_admin": authed.is_admin,
        "artist_id": artist_id,
    })))
}

/// DELETE /api/me
/// Removes the account; artist profile, videos, bookings and bookmarks cascade.
pub async fn delete_me(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let storage_keys: Vec<String> = sqlx::query_scalar(
        "SELECT storage_key FROM videos WHERE user_id = ? AND storage_key IS NOT NULL",
    )
    .bind(&authed.id)
    .fetch_all(&state.db)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&authed.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    for key in storage_keys {
        if let Err(e) = state.aws_service.delete_file(&key).await {
            warn!(error = %e, key = %key, "Failed to delete uploaded object for removed account");
        }
    }

    info!(user_id = %authed.id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/logout
/// JWTs are stateless; the client discards its token
pub async fn logout_handler(authed: AuthedUser) -> Result<Json<serde_json::Value>, ApiError> {
    info!(user_id = %authed.id, "User logout successful");
    Ok(Json(serde_json::json!({ "message": "Logout successful" })))
}
