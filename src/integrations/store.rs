//! Provider tokens and identity kept on the artist row

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::common::ApiError;
use crate::services::oauth::{ProviderIdentity, ProviderTokens};
use crate::services::Provider;

/// Column names holding one provider's connection
struct Columns {
    access_token: &'static str,
    refresh_token: Option<&'static str>,
    expiry: &'static str,
    provider_id: &'static str,
    username: &'static str,
    connected_at: &'static str,
}

fn columns(provider: Provider) -> Columns {
    match provider {
        Provider::YouTube => Columns {
            access_token: "youtube_access_token",
            refresh_token: Some("youtube_refresh_token"),
            expiry: "youtube_token_expiry",
            provider_id: "youtube_channel_id",
            username: "youtube_channel_title",
            connected_at: "youtube_connected_at",
        },
        Provider::Instagram => Columns {
            access_token: "instagram_access_token",
            refresh_token: None,
            expiry: "instagram_token_expiry",
            provider_id: "instagram_id",
            username: "instagram_username",
            connected_at: "instagram_connected_at",
        },
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StoredTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// RFC 3339, compared verbatim by the conditional refresh write
    pub expiry: Option<String>,
}

impl StoredTokens {
    pub fn expiry_time(&self) -> Option<DateTime<Utc>> {
        self.expiry
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// `None` when the artist row does not exist
pub async fn load_tokens(
    db: &SqlitePool,
    provider: Provider,
    artist_id: &str,
) -> Result<Option<StoredTokens>, ApiError> {
    let cols = columns(provider);
    let sql = format!(
        "SELECT {} AS access_token, {} AS refresh_token, {} AS expiry FROM artists WHERE id = ?",
        cols.access_token,
        cols.refresh_token.unwrap_or("NULL"),
        cols.expiry
    );

    let tokens = sqlx::query_as::<_, StoredTokens>(&sql)
        .bind(artist_id)
        .fetch_optional(db)
        .await?;
    Ok(tokens)
}

/// Persists a refreshed token only if the expiry is still the one that was read.
/// Returns false when a concurrent refresh or a disconnect got there first.
pub async fn save_refreshed(
    db: &SqlitePool,
    provider: Provider,
    artist_id: &str,
    tokens: &ProviderTokens,
    new_expiry: &str,
    previous_expiry: Option<&str>,
) -> Result<bool, ApiError> {
    let cols = columns(provider);
    let refresh_clause = match cols.refresh_token {
        Some(col) => format!(", {col} = COALESCE(?, {col})"),
        None => String::new(),
    };
    let sql = format!(
        "UPDATE artists SET {access} = ?, {expiry} = ?{refresh}, updated_at = datetime('now') \
         WHERE id = ? AND {access} IS NOT NULL AND {expiry} IS ?",
        access = cols.access_token,
        expiry = cols.expiry,
        refresh = refresh_clause,
    );

    let mut query = sqlx::query(&sql).bind(&tokens.access_token).bind(new_expiry);
    if cols.refresh_token.is_some() {
        query = query.bind(tokens.refresh_token.as_deref());
    }
    let result = query
        .bind(artist_id)
        .bind(previous_expiry)
        .execute(db)
        .await?;

    Ok(result.rows_affected() == 1)
}

/// Stores a completed OAuth connection
pub async fn save_connection(
    db: &SqlitePool,
    provider: Provider,
    artist_id: &str,
    tokens: &ProviderTokens,
    identity: &ProviderIdentity,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let cols = columns(provider);
    let expiry = (now + chrono::Duration::seconds(tokens.expires_in)).to_rfc3339();

    let refresh_clause = match cols.refresh_token {
        Some(col) => format!("{col} = COALESCE(?, {col}), "),
        None => String::new(),
    };
    let sql = format!(
        "UPDATE artists SET {access} = ?, {refresh}{expiry} = ?, {pid} = ?, {user} = ?, {at} = ?, \
         updated_at = datetime('now') WHERE id = ?",
        access = cols.access_token,
        refresh = refresh_clause,
        expiry = cols.expiry,
        pid = cols.provider_id,
        user = cols.username,
        at = cols.connected_at,
    );

    let mut query = sqlx::query(&sql).bind(&tokens.access_token);
    if cols.refresh_token.is_some() {
        query = query.bind(tokens.refresh_token.as_deref());
    }
    let result = query
        .bind(&expiry)
        .bind(&identity.id)
        .bind(identity.username.as_deref())
        .bind(now.to_rfc3339())
        .bind(artist_id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Artist profile not found".to_string()));
    }
    Ok(())
}

/// Clears every column of the provider in one statement
pub async fn disconnect(db: &SqlitePool, provider: Provider, artist_id: &str) -> Result<bool, ApiError> {
    let cols = columns(provider);
    let mut assignments = vec![
        cols.access_token,
        cols.expiry,
        cols.provider_id,
        cols.username,
        cols.connected_at,
    ];
    if let Some(col) = cols.refresh_token {
        assignments.push(col);
    }
    let set = assignments
        .iter()
        .map(|col| format!("{} = NULL", col))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!(
        "UPDATE artists SET {}, updated_at = datetime('now') WHERE id = ?",
        set
    );
    let result = sqlx::query(&sql).bind(artist_id).execute(db).await?;
    Ok(result.rows_affected() == 1)
}

#[derive(Debug, FromRow)]
struct StatusRow {
    youtube_channel_id: Option<String>,
    youtube_channel_title: Option<String>,
    youtube_connected_at: Option<String>,
    instagram_id: Option<String>,
    instagram_username: Option<String>,
    instagram_connected_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub connected_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationStatus {
    pub youtube: ConnectionStatus,
    pub instagram: ConnectionStatus,
}

pub async fn connection_status(db: &SqlitePool, artist_id: &str) -> Result<IntegrationStatus, ApiError> {
    let row = sqlx::query_as::<_, StatusRow>(
        r#"
        SELECT youtube_channel_id, youtube_channel_title, youtube_connected_at,
               instagram_id, instagram_username, instagram_connected_at
        FROM artists WHERE id = ?
        "#,
    )
    .bind(artist_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

    Ok(IntegrationStatus {
        youtube: ConnectionStatus {
            connected: row.youtube_channel_id.is_some(),
            account_id: row.youtube_channel_id,
            account_name: row.youtube_channel_title,
            connected_at: row.youtube_connected_at,
        },
        instagram: ConnectionStatus {
            connected: row.instagram_id.is_some(),
            account_id: row.instagram_id,
            account_name: row.instagram_username,
            connected_at: row.instagram_connected_at,
        },
    })
}

pub async fn artist_user_id(db: &SqlitePool, artist_id: &str) -> Result<Option<String>, ApiError> {
    let user_id = sqlx::query_scalar::<_, String>("SELECT user_id FROM artists WHERE id = ?")
        .bind(artist_id)
        .fetch_optional(db)
        .await?;
    Ok(user_id)
}
