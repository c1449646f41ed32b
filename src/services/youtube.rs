// src/services/youtube.rs
//! YouTube Data API v3 integration: channel connect, token refresh and shorts listing

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::oauth::{
    api_error, MediaItem, OAuthProvider, Provider, ProviderError, ProviderIdentity,
    ProviderTokens, MEDIA_PAGE_SIZE,
};
use crate::common::config::GoogleConfig;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const API_BASE: &str = "https://www.googleapis.com/youtube/v3";
const SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";

/// Longest video YouTube still classifies as a Short
pub const SHORTS_MAX_SECONDS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    items: Option<Vec<ChannelItem>>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    snippet: Option<ChannelSnippet>,
    #[serde(rename = "contentDetails")]
    content_details: Option<ChannelContentDetails>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ChannelContentDetails {
    #[serde(rename = "relatedPlaylists")]
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsResponse {
    items: Option<Vec<PlaylistItem>>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    #[serde(rename = "contentDetails")]
    content_details: PlaylistItemContentDetails,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemContentDetails {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    items: Option<Vec<VideoItem>>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    #[serde(rename = "contentDetails")]
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}

#[derive(Clone)]
pub struct YouTubeProvider {
    client: Client,
    config: GoogleConfig,
    redirect_uri: String,
}

impl YouTubeProvider {
    pub fn new(client: Client, config: GoogleConfig, redirect_uri: String) -> Self {
        Self {
            client,
            config,
            redirect_uri,
        }
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<ProviderTokens, ProviderError> {
        let response = self.client.post(TOKEN_URL).form(params).send().await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            error!(error = %err, "YouTube token endpoint rejected the request");
            return Err(err);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(ProviderTokens {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(format!("{}/{}", API_BASE, path))
            .query(query)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            error!(error = %err, path = %path, "YouTube API error");
            return Err(err);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    async fn my_channel(&self, access_token: &str, part: &str) -> Result<ChannelItem, ProviderError> {
        let channels: ChannelListResponse = self
            .get_json("channels", access_token, &[("part", part), ("mine", "true")])
            .await?;

        channels
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("account has no YouTube channel".to_string()))
    }

    async fn video_details(
        &self,
        access_token: &str,
        video_ids: &[String],
    ) -> Result<Vec<MediaItem>, ProviderError> {
        let ids = video_ids.join(",");
        let videos: VideoListResponse = self
            .get_json(
                "videos",
                access_token,
                &[("part", "snippet,contentDetails"), ("id", ids.as_str())],
            )
            .await?;

        Ok(videos
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                let thumbnail_url = item
                    .snippet
                    .thumbnails
                    .and_then(|t| t.high.or(t.medium).or(t.default))
                    .map(|t| t.url)
                    .unwrap_or_else(|| format!("https://img.youtube.com/vi/{}/mqdefault.jpg", item.id));

                MediaItem {
                    url: format!("https://www.youtube.com/shorts/{}", item.id),
                    title: item.snippet.title,
                    thumbnail_url: Some(thumbnail_url),
                    duration_seconds: item
                        .content_details
                        .as_ref()
                        .and_then(|cd| parse_iso8601_duration(&cd.duration)),
                    media_type: "VIDEO".to_string(),
                    published_at: item.snippet.published_at,
                }
            })
            .collect())
    }
}

#[async_trait]
impl OAuthProvider for YouTubeProvider {
    fn provider(&self) -> Provider {
        Provider::YouTube
    }

    fn authorization_url(&self, state: &str) -> String {
        // offline + consent so Google issues a refresh token
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            AUTH_URL,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(SCOPE),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderTokens, ProviderError> {
        debug!("Exchanging YouTube authorization code");
        let tokens = self
            .token_request(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;

        info!(
            has_refresh_token = tokens.refresh_token.is_some(),
            "YouTube authorization code exchanged"
        );
        Ok(tokens)
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        let channel = self.my_channel(access_token, "snippet").await?;
        Ok(ProviderIdentity {
            id: channel.id,
            username: channel.snippet.map(|s| s.title),
        })
    }

    async fn refresh(
        &self,
        _access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<ProviderTokens, ProviderError> {
        let refresh_token = refresh_token.ok_or(ProviderError::MissingRefreshToken)?;

        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn list_media(
        &self,
        access_token: &str,
        max_pages: usize,
    ) -> Result<Vec<MediaItem>, ProviderError> {
        let channel = self.my_channel(access_token, "contentDetails").await?;
        let uploads = channel
            .content_details
            .map(|cd| cd.related_playlists.uploads)
            .ok_or_else(|| ProviderError::InvalidResponse("channel has no uploads playlist".to_string()))?;

        let page_size = MEDIA_PAGE_SIZE.to_string();
        let mut media = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..max_pages {
            let mut query = vec![
                ("part", "contentDetails"),
                ("playlistId", uploads.as_str()),
                ("maxResults", page_size.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let items: PlaylistItemsResponse =
                self.get_json("playlistItems", access_token, &query).await?;

            let video_ids: Vec<String> = items
                .items
                .unwrap_or_default()
                .into_iter()
                .map(|item| item.content_details.video_id)
                .collect();

            if !video_ids.is_empty() {
                media.extend(self.video_details(access_token, &video_ids).await?);
            }

            debug!(page = page + 1, fetched = video_ids.len(), "Fetched YouTube uploads page");

            match items.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(media)
    }
}

/// Converts an ISO-8601 duration such as `PT1M5S` or `P1DT2H` into seconds
pub fn parse_iso8601_duration(value: &str) -> Option<i64> {
    let rest = value.strip_prefix('P')?;
    let mut total = 0i64;
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            'T' if number.is_empty() && !in_time => in_time = true,
            '0'..='9' => number.push(c),
            unit => {
                let n: i64 = number.parse().ok()?;
                number.clear();
                let seconds = match (unit, in_time) {
                    ('W', false) => 604_800,
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                total = total.checked_add(n.checked_mul(seconds)?)?;
                saw_component = true;
            }
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }
    Some(total)
}

/// Zero-length items are upcoming or live placeholders, not Shorts
pub fn is_short_duration(seconds: i64) -> bool {
    (1..=SHORTS_MAX_SECONDS).contains(&seconds)
}
