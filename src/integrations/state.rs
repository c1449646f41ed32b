//! OAuth `state` parameter: HS256 token naming the user and provider, timestamped

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::Provider;

pub const STATE_MAX_AGE_MINUTES: i64 = 15;
pub const STATE_MAX_SKEW_MINUTES: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthState {
    pub user_id: String,
    pub provider: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("state could not be decoded")]
    Malformed,
    #[error("state signature does not match")]
    BadSignature,
    #[error("state was issued for another provider")]
    WrongProvider,
    #[error("state has expired")]
    Expired,
    #[error("state timestamp is in the future")]
    FromFuture,
    #[error("state could not be signed")]
    Signing,
}

impl StateError {
    /// Value of the `error` query parameter on the frontend redirect
    pub fn reason(&self) -> &'static str {
        match self {
            StateError::Malformed | StateError::BadSignature | StateError::FromFuture => {
                "invalid_state"
            }
            StateError::WrongProvider => "provider_mismatch",
            StateError::Expired => "state_expired",
            StateError::Signing => "connection_failed",
        }
    }
}

pub fn encode_state(
    secret: &str,
    user_id: &str,
    provider: Provider,
    now: DateTime<Utc>,
) -> Result<String, StateError> {
    let state = OAuthState {
        user_id: user_id.to_string(),
        provider: provider.as_str().to_string(),
        timestamp: now.timestamp_millis(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &state,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| StateError::Signing)
}

pub fn verify_state(
    secret: &str,
    raw: &str,
    expected: Provider,
    now: DateTime<Utc>,
) -> Result<OAuthState, StateError> {
    // Freshness is checked against `timestamp` below
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let state = decode::<OAuthState>(
        raw.trim(),
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature => StateError::BadSignature,
        _ => StateError::Malformed,
    })?
    .claims;

    if state.user_id.is_empty() {
        return Err(StateError::Malformed);
    }
    if state.provider != expected.as_str() {
        return Err(StateError::WrongProvider);
    }

    let age_ms = now.timestamp_millis() - state.timestamp;
    if age_ms > Duration::minutes(STATE_MAX_AGE_MINUTES).num_milliseconds() {
        return Err(StateError::Expired);
    }
    if -age_ms > Duration::minutes(STATE_MAX_SKEW_MINUTES).num_milliseconds() {
        return Err(StateError::FromFuture);
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    const SECRET: &str = "state_secret";

    #[test]
    fn test_fresh_state_round_trips() {
        let now = Utc::now();
        let raw = encode_state(SECRET, "U_ABC123", Provider::Instagram, now).unwrap();
        assert!(!raw.contains('='));

        let state = verify_state(SECRET, &raw, Provider::Instagram, now + Duration::minutes(14)).unwrap();
        assert_eq!(state.user_id, "U_ABC123");
        assert_eq!(state.provider, "instagram");
    }

    #[test]
    fn test_state_window() {
        let issued = Utc::now();
        let raw = encode_state(SECRET, "U_ABC123", Provider::YouTube, issued).unwrap();

        assert_eq!(
            verify_state(SECRET, &raw, Provider::YouTube, issued + Duration::minutes(16)),
            Err(StateError::Expired)
        );
        assert_eq!(
            verify_state(SECRET, &raw, Provider::YouTube, issued - Duration::minutes(2)),
            Err(StateError::FromFuture)
        );
        // Small clock skew is tolerated
        assert!(verify_state(SECRET, &raw, Provider::YouTube, issued - Duration::seconds(30)).is_ok());
    }

    #[test]
    fn test_wrong_provider_and_garbage() {
        let now = Utc::now();
        let raw = encode_state(SECRET, "U_ABC123", Provider::YouTube, now).unwrap();
        assert_eq!(
            verify_state(SECRET, &raw, Provider::Instagram, now),
            Err(StateError::WrongProvider)
        );
        assert_eq!(
            verify_state(SECRET, "not a token !!", Provider::YouTube, now),
            Err(StateError::Malformed)
        );
    }

    #[test]
    fn test_unsigned_or_foreign_states_are_rejected() {
        let now = Utc::now();

        let bare_json = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"user_id":"U_VICTIM","provider":"youtube","timestamp":{}}}"#,
            now.timestamp_millis()
        ));
        let err = verify_state(SECRET, &bare_json, Provider::YouTube, now).unwrap_err();
        assert_eq!(err.reason(), "invalid_state");

        let other_key = encode_state("someone_else", "U_VICTIM", Provider::YouTube, now).unwrap();
        assert_eq!(
            verify_state(SECRET, &other_key, Provider::YouTube, now),
            Err(StateError::BadSignature)
        );
    }
}
