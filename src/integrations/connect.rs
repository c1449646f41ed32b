//! Browser-facing OAuth connect flow for artist integrations

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use super::state::{encode_state, verify_state, StateError};
use super::store;
use crate::auth::authz::artist_id_for_user;
use crate::services::{OAuthProvider, Provider};

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Authorization URL for `user_id`, carrying a state signed with `secret`
pub fn authorization_url(
    provider: &dyn OAuthProvider,
    secret: &str,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<String, StateError> {
    let state = encode_state(secret, user_id, provider.provider(), now)?;
    Ok(provider.authorization_url(&state))
}

/// Validates the callback, exchanges the code and stores the connection.
/// Returns the failure reason used on the frontend redirect.
pub async fn complete_connection(
    db: &SqlitePool,
    provider: &dyn OAuthProvider,
    secret: &str,
    params: &CallbackParams,
    now: DateTime<Utc>,
) -> Result<(), &'static str> {
    let kind = provider.provider();

    if let Some(denied) = &params.error {
        warn!(provider = %kind, error = %denied, "Provider returned an OAuth error");
        return Err("access_denied");
    }

    let raw_state = params.state.as_deref().ok_or("invalid_state")?;
    let state = verify_state(secret, raw_state, kind, now).map_err(|e| {
        warn!(provider = %kind, error = %e, "Rejected OAuth state");
        e.reason()
    })?;

    let code = params
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or("missing_code")?;

    let artist_id = artist_id_for_user(db, &state.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Artist lookup failed during OAuth callback");
            "connection_failed"
        })?
        .ok_or("no_artist_profile")?;

    let tokens = provider.exchange_code(code).await.map_err(|e| {
        error!(error = %e, provider = %kind, artist_id = %artist_id, "Code exchange failed");
        "token_exchange_failed"
    })?;

    let identity = provider
        .fetch_identity(&tokens.access_token)
        .await
        .map_err(|e| {
            error!(error = %e, provider = %kind, artist_id = %artist_id, "Identity lookup failed");
            "profile_fetch_failed"
        })?;

    store::save_connection(db, kind, &artist_id, &tokens, &identity, now)
        .await
        .map_err(|e| {
            error!(error = %e, provider = %kind, artist_id = %artist_id, "Failed to store connection");
            "connection_failed"
        })?;

    info!(
        provider = %kind,
        artist_id = %artist_id,
        account_id = %identity.id,
        "Integration connected"
    );
    Ok(())
}

/// `{frontend}/artist/dashboard/integrations?connected=<provider>` or `?error=<reason>`
pub fn redirect_url(frontend_url: &str, provider: Provider, outcome: Result<(), &str>) -> String {
    let base = format!(
        "{}/artist/dashboard/integrations",
        frontend_url.trim_end_matches('/')
    );
    match outcome {
        Ok(()) => format!("{}?connected={}", base, provider.as_str()),
        Err(reason) => format!("{}?error={}", base, urlencoding::encode(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_urls() {
        assert_eq!(
            redirect_url("https://andaction.in/", Provider::Instagram, Ok(())),
            "https://andaction.in/artist/dashboard/integrations?connected=instagram"
        );
        assert_eq!(
            redirect_url("https://andaction.in", Provider::YouTube, Err("state_expired")),
            "https://andaction.in/artist/dashboard/integrations?error=state_expired"
        );
    }
}
