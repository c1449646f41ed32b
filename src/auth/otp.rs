//! Short-lived verification tokens: phone OTP codes and email verification links

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::common::{generate_raw_id, generate_token_id, ApiError};

pub const OTP_TTL_MINUTES: i64 = 10;
pub const EMAIL_TOKEN_TTL_HOURS: i64 = 24;
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;
pub const MAX_OTP_ATTEMPTS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    PhoneOtp,
    EmailVerification,
}

impl TokenPurpose {
    fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::PhoneOtp => "phone_otp",
            TokenPurpose::EmailVerification => "email_verification",
        }
    }
}

/// Six digit numeric code, zero padded
pub fn generate_otp_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// Opaque token for links sent by email
pub fn generate_link_token() -> String {
    generate_raw_id(32)
}

/// Stores `token` for `identifier`, replacing any earlier one with the same purpose
pub async fn issue(
    db: &SqlitePool,
    identifier: &str,
    purpose: TokenPurpose,
    token: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let mut tx = db.begin().await?;

    sqlx::query("DELETE FROM verification_tokens WHERE identifier = ? AND purpose = ?")
        .bind(identifier)
        .bind(purpose.as_str())
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO verification_tokens (id, identifier, token, purpose, expires_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(generate_token_id())
    .bind(identifier)
    .bind(token)
    .bind(purpose.as_str())
    .bind((now + ttl).to_rfc3339())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Deletes a matching token and returns its identifier when it had not expired.
/// With `identifier` set (OTP codes, which are not unique on their own) the
/// pending code is looked up by identifier; every wrong guess is counted and
/// the code is discarded after `MAX_OTP_ATTEMPTS` misses.
pub async fn consume(
    db: &SqlitePool,
    identifier: Option<&str>,
    purpose: TokenPurpose,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>, ApiError> {
    let row: Option<(String, String, String)> = match identifier {
        Some(identifier) => {
            let pending: Option<(String, String, String)> = sqlx::query_as(
                "SELECT id, token, expires_at FROM verification_tokens WHERE identifier = ? AND purpose = ?",
            )
            .bind(identifier)
            .bind(purpose.as_str())
            .fetch_optional(db)
            .await?;

            match pending {
                Some((id, expected, expires_at)) if expected == token => {
                    Some((id, identifier.to_string(), expires_at))
                }
                Some((id, _, _)) => {
                    record_failed_attempt(db, &id).await?;
                    None
                }
                None => None,
            }
        }
        None => {
            sqlx::query_as(
                "SELECT id, identifier, expires_at FROM verification_tokens WHERE purpose = ? AND token = ?",
            )
            .bind(purpose.as_str())
            .bind(token)
            .fetch_optional(db)
            .await?
        }
    };

    let Some((id, identifier, expires_at)) = row else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM verification_tokens WHERE id = ?")
        .bind(&id)
        .execute(db)
        .await?;

    let still_valid = DateTime::parse_from_rfc3339(&expires_at)
        .map(|exp| exp.with_timezone(&Utc) > now)
        .unwrap_or(false);

    if !still_valid {
        debug!(token_id = %id, "Verification token expired");
        return Ok(None);
    }

    Ok(Some(identifier))
}

async fn record_failed_attempt(db: &SqlitePool, id: &str) -> Result<(), ApiError> {
    let updated: Option<(i64,)> = sqlx::query_as(
        "UPDATE verification_tokens SET attempts = attempts + 1 WHERE id = ? RETURNING attempts",
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    // Already consumed or discarded by a concurrent request
    let Some((attempts,)) = updated else {
        return Ok(());
    };

    if attempts >= MAX_OTP_ATTEMPTS {
        sqlx::query("DELETE FROM verification_tokens WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        warn!(token_id = %id, attempts, "Verification code discarded after repeated misses");
    }
    Ok(())
}
