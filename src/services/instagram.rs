// src/services/instagram.rs
//! Instagram Graph API integration: account connect, long-lived token refresh and reels listing

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::oauth::{
    api_error, MediaItem, OAuthProvider, Provider, ProviderError, ProviderIdentity,
    ProviderTokens, MEDIA_PAGE_SIZE,
};
use crate::common::config::InstagramConfig;

const AUTH_URL: &str = "https://www.instagram.com/oauth/authorize";
const SHORT_LIVED_TOKEN_URL: &str = "https://api.instagram.com/oauth/access_token";
const GRAPH_BASE: &str = "https://graph.instagram.com";
const SCOPE: &str = "instagram_business_basic";
const MEDIA_FIELDS: &str =
    "id,caption,media_type,media_product_type,media_url,permalink,thumbnail_url,timestamp";

/// Long-lived tokens last 60 days when the response omits `expires_in`
const LONG_LIVED_SECONDS: i64 = 60 * 24 * 60 * 60;

/// Media types kept by the reels sync
pub const SYNCED_MEDIA_TYPES: [&str; 2] = ["VIDEO", "REEL"];

#[derive(Debug, Deserialize)]
struct ShortLivedToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct LongLivedToken {
    access_token: String,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Me {
    id: String,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaPage {
    #[serde(default)]
    data: Vec<InstagramMedia>,
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstagramMedia {
    caption: Option<String>,
    media_type: String,
    media_product_type: Option<String>,
    media_url: Option<String>,
    permalink: Option<String>,
    thumbnail_url: Option<String>,
    timestamp: Option<String>,
}

impl InstagramMedia {
    fn into_media_item(self) -> Option<MediaItem> {
        // Permalinks are stable; media_url is a signed CDN link that rotates
        let url = self.permalink.or(self.media_url)?;
        let media_type = match self.media_product_type.as_deref() {
            Some("REELS") => "REEL".to_string(),
            _ => self.media_type,
        };
        let title = self
            .caption
            .as_deref()
            .and_then(|c| c.lines().next())
            .map(|line| line.chars().take(100).collect::<String>())
            .filter(|line| !line.trim().is_empty())
            .unwrap_or_else(|| "Instagram Reel".to_string());

        Some(MediaItem {
            url,
            title,
            thumbnail_url: self.thumbnail_url,
            duration_seconds: None,
            media_type,
            published_at: self.timestamp,
        })
    }
}

#[derive(Clone)]
pub struct InstagramProvider {
    client: Client,
    config: InstagramConfig,
    redirect_uri: String,
}

impl InstagramProvider {
    pub fn new(client: Client, config: InstagramConfig, redirect_uri: String) -> Self {
        Self {
            client,
            config,
            redirect_uri,
        }
    }

    async fn long_lived_get(&self, url: &str, query: &[(&str, &str)]) -> Result<ProviderTokens, ProviderError> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            error!(error = %err, "Instagram token endpoint rejected the request");
            return Err(err);
        }

        let token: LongLivedToken = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ProviderTokens {
            access_token: token.access_token,
            refresh_token: None,
            expires_in: token.expires_in.unwrap_or(LONG_LIVED_SECONDS),
        })
    }
}

#[async_trait]
impl OAuthProvider for InstagramProvider {
    fn provider(&self) -> Provider {
        Provider::Instagram
    }

    fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            AUTH_URL,
            urlencoding::encode(&self.config.app_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPE),
            urlencoding::encode(state)
        )
    }

    /// Code → short-lived token → long-lived token
    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError> {
        let params = [
            ("client_id", self.config.app_id.as_str()),
            ("client_secret", self.config.app_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code", code),
        ];

        let response = self
            .client
            .post(SHORT_LIVED_TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            error!(error = %err, "Instagram code exchange failed");
            return Err(err);
        }

        let short: ShortLivedToken = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let tokens = self
            .long_lived_get(
                &format!("{}/access_token", GRAPH_BASE),
                &[
                    ("grant_type", "ig_exchange_token"),
                    ("client_secret", self.config.app_secret.as_str()),
                    ("access_token", short.access_token.as_str()),
                ],
            )
            .await?;

        info!(expires_in = tokens.expires_in, "Instagram long-lived token issued");
        Ok(tokens)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        let response = self
            .client
            .get(format!("{}/me", GRAPH_BASE))
            .query(&[("fields", "id,username"), ("access_token", access_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let me: Me = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ProviderIdentity {
            id: me.id,
            username: me.username,
        })
    }

    /// Long-lived tokens refresh themselves through the `ig_refresh_token` grant
    async fn refresh(
        &self,
        access_token: &str,
        _refresh_token: Option<&str>,
    ) -> Result<ProviderTokens, ProviderError> {
        self.long_lived_get(
            &format!("{}/refresh_access_token", GRAPH_BASE),
            &[
                ("grant_type", "ig_refresh_token"),
                ("access_token", access_token),
            ],
        )
        .await
    }

    async fn list_media(
        &self,
        access_token: &str,
        max_pages: usize,
    ) -> Result<Vec<MediaItem>, ProviderError> {
        let limit = MEDIA_PAGE_SIZE.to_string();
        let mut media = Vec::new();

        let first = self
            .client
            .get(format!("{}/me/media", GRAPH_BASE))
            .query(&[
                ("fields", MEDIA_FIELDS),
                ("limit", limit.as_str()),
                ("access_token", access_token),
            ]);
        let mut request = Some(first);

        for page in 0..max_pages {
            let Some(current) = request.take() else {
                break;
            };

            let response = current.send().await?;
            if !response.status().is_success() {
                let err = api_error(response).await;
                error!(error = %err, page = page + 1, "Instagram media listing failed");
                return Err(err);
            }

            let body: MediaPage = response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

            debug!(page = page + 1, fetched = body.data.len(), "Fetched Instagram media page");
            media.extend(body.data.into_iter().filter_map(InstagramMedia::into_media_item));

            // `paging.next` is a complete URL with the token already embedded
            request = body
                .paging
                .and_then(|p| p.next)
                .map(|next| self.client.get(next));
        }

        Ok(media)
    }
}
