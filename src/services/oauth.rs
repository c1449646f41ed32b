// src/services/oauth.rs
//! Contract shared by the content providers an artist can connect

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::common::ApiError;

/// Provider-side page size used when listing media
pub const MEDIA_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    YouTube,
    Instagram,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::YouTube => "youtube",
            Provider::Instagram => "instagram",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::YouTube => "YouTube",
            Provider::Instagram => "Instagram",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "youtube" => Some(Provider::YouTube),
            "instagram" => Some(Provider::Instagram),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTokens {
    pub access_token: String,
    /// Only YouTube issues refresh tokens, and not on every grant
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderIdentity {
    /// Channel id for YouTube, account id for Instagram
    pub id: String,
    /// Channel title for YouTube, handle for Instagram
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    pub url: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i64>,
    pub media_type: String,
    pub published_at: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} integration not configured")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("provider returned HTTP {status}")]
    Api { status: u16, body: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("no refresh token stored")]
    MissingRefreshToken,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::RequestFailed(e.to_string())
    }
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn provider(&self) -> Provider;

    /// Consent screen URL carrying the signed `state`
    fn authorization_url(&self, state: &str) -> String;

    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError>;

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError>;

    async fn refresh(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<ProviderTokens, ProviderError>;

    /// Lists the account's media, following at most `max_pages` cursors
    async fn list_media(
        &self,
        access_token: &str,
        max_pages: usize,
    ) -> Result<Vec<MediaItem>, ProviderError>;
}

/// Providers available to this process; a provider without credentials is absent
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    pub youtube: Option<Arc<dyn OAuthProvider>>,
    pub instagram: Option<Arc<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    pub fn get(&self, provider: Provider) -> Result<Arc<dyn OAuthProvider>, ApiError> {
        let found = match provider {
            Provider::YouTube => self.youtube.clone(),
            Provider::Instagram => self.instagram.clone(),
        };
        found.ok_or_else(|| {
            ApiError::ServiceUnavailable(format!(
                "{} integration is not configured",
                provider.display_name()
            ))
        })
    }
}

/// Reads an error body for logging; never surfaced to clients
pub(crate) async fn api_error(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    ProviderError::Api { status, body }
}
