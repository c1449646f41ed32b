//! Integration token and sync behaviour against a scripted provider

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::connect::{complete_connection, CallbackParams};
use super::refresher::get_valid_token_at;
use super::state::encode_state;
use super::{store, syncer};
use crate::common::migrations::{fixtures, test_pool};
use crate::services::oauth::{
    MediaItem, OAuthProvider, Provider, ProviderError, ProviderIdentity, ProviderTokens,
};

const SECRET: &str = "test_secret";

struct FakeProvider {
    kind: Provider,
    refresh_calls: AtomicUsize,
    exchange_calls: AtomicUsize,
    refresh_result: Mutex<Option<ProviderTokens>>,
    media: Vec<MediaItem>,
}

impl FakeProvider {
    fn new(kind: Provider) -> Self {
        Self {
            kind,
            refresh_calls: AtomicUsize::new(0),
            exchange_calls: AtomicUsize::new(0),
            refresh_result: Mutex::new(None),
            media: Vec::new(),
        }
    }

    fn refreshing_to(self, tokens: ProviderTokens) -> Self {
        *self.refresh_result.lock().unwrap() = Some(tokens);
        self
    }

    fn with_media(mut self, media: Vec<MediaItem>) -> Self {
        self.media = media;
        self
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthProvider for FakeProvider {
    fn provider(&self) -> Provider {
        self.kind
    }

    fn authorization_url(&self, state: &str) -> String {
        format!("https://provider.test/authorize?state={}", state)
    }

    async fn exchange_code(&self, _code: &str) -> Result<ProviderTokens, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderTokens {
            access_token: "exchanged-token".to_string(),
            refresh_token: Some("exchanged-refresh".to_string()),
            expires_in: 3600,
        })
    }

    async fn fetch_identity(&self, _access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        Ok(ProviderIdentity {
            id: "acct-1".to_string(),
            username: Some("stage.handle".to_string()),
        })
    }

    async fn refresh(
        &self,
        _access_token: &str,
        _refresh_token: Option<&str>,
    ) -> Result<ProviderTokens, ProviderError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_result
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ProviderError::Api {
                status: 400,
                body: "invalid_grant".to_string(),
            })
    }

    async fn list_media(
        &self,
        _access_token: &str,
        _max_pages: usize,
    ) -> Result<Vec<MediaItem>, ProviderError> {
        Ok(self.media.clone())
    }
}

fn reel(url: &str, media_type: &str) -> MediaItem {
    MediaItem {
        url: url.to_string(),
        title: "Reel".to_string(),
        thumbnail_url: None,
        duration_seconds: None,
        media_type: media_type.to_string(),
        published_at: None,
    }
}

async fn connected_artist(pool: &SqlitePool, provider: Provider, expires_in: i64) {
    fixtures::insert_artist(pool, "A_1", "U_1").await;
    store::save_connection(
        pool,
        provider,
        "A_1",
        &ProviderTokens {
            access_token: "stored-token".to_string(),
            refresh_token: Some("stored-refresh".to_string()),
            expires_in,
        },
        &ProviderIdentity {
            id: "acct-1".to_string(),
            username: Some("stage.handle".to_string()),
        },
        Utc::now(),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_unconnected_artist_gets_no_token_and_no_call() {
    let pool = test_pool().await;
    fixtures::insert_artist(&pool, "A_1", "U_1").await;
    let provider = FakeProvider::new(Provider::Instagram);

    let token = get_valid_token_at(&pool, &provider, "A_1", Utc::now()).await.unwrap();
    assert!(token.is_none());
    assert_eq!(provider.refresh_calls(), 0);
}

#[tokio::test]
async fn test_fresh_token_is_returned_without_provider_call() {
    let pool = test_pool().await;
    connected_artist(&pool, Provider::Instagram, 3600).await;
    let provider = FakeProvider::new(Provider::Instagram);

    let token = get_valid_token_at(&pool, &provider, "A_1", Utc::now()).await.unwrap();
    assert_eq!(token.as_deref(), Some("stored-token"));
    assert_eq!(provider.refresh_calls(), 0);
}

#[tokio::test]
async fn test_token_inside_buffer_is_refreshed_and_persisted() {
    let pool = test_pool().await;
    // Expires in 4 minutes, inside the 5 minute buffer
    connected_artist(&pool, Provider::Instagram, 240).await;
    let provider = FakeProvider::new(Provider::Instagram).refreshing_to(ProviderTokens {
        access_token: "refreshed-token".to_string(),
        refresh_token: None,
        expires_in: 5_184_000,
    });

    let now = Utc::now();
    let token = get_valid_token_at(&pool, &provider, "A_1", now).await.unwrap();
    assert_eq!(token.as_deref(), Some("refreshed-token"));
    assert_eq!(provider.refresh_calls(), 1);

    let stored = store::load_tokens(&pool, Provider::Instagram, "A_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("refreshed-token"));
    assert!(stored.expiry_time().unwrap() > now + Duration::days(59));

    // Now fresh, so no second refresh
    get_valid_token_at(&pool, &provider, "A_1", now).await.unwrap();
    assert_eq!(provider.refresh_calls(), 1);
}

#[tokio::test]
async fn test_youtube_refresh_token_kept_when_provider_omits_it() {
    let pool = test_pool().await;
    connected_artist(&pool, Provider::YouTube, -60).await;
    let provider = FakeProvider::new(Provider::YouTube).refreshing_to(ProviderTokens {
        access_token: "refreshed-token".to_string(),
        refresh_token: None,
        expires_in: 3600,
    });

    get_valid_token_at(&pool, &provider, "A_1", Utc::now()).await.unwrap();

    let stored = store::load_tokens(&pool, Provider::YouTube, "A_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("refreshed-token"));
    assert_eq!(stored.refresh_token.as_deref(), Some("stored-refresh"));
}

#[tokio::test]
async fn test_youtube_refresh_token_replaced_when_provider_rotates_it() {
    let pool = test_pool().await;
    connected_artist(&pool, Provider::YouTube, -60).await;
    let provider = FakeProvider::new(Provider::YouTube).refreshing_to(ProviderTokens {
        access_token: "refreshed-token".to_string(),
        refresh_token: Some("rotated-refresh".to_string()),
        expires_in: 3600,
    });

    get_valid_token_at(&pool, &provider, "A_1", Utc::now()).await.unwrap();

    let stored = store::load_tokens(&pool, Provider::YouTube, "A_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.refresh_token.as_deref(), Some("rotated-refresh"));
}

#[tokio::test]
async fn test_failed_refresh_returns_none_after_one_attempt() {
    let pool = test_pool().await;
    connected_artist(&pool, Provider::Instagram, -60).await;
    let provider = FakeProvider::new(Provider::Instagram);

    let token = get_valid_token_at(&pool, &provider, "A_1", Utc::now()).await.unwrap();
    assert!(token.is_none());
    assert_eq!(provider.refresh_calls(), 1);

    // Stored token untouched
    let stored = store::load_tokens(&pool, Provider::Instagram, "A_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("stored-token"));
}

#[tokio::test]
async fn test_concurrent_refresh_loser_returns_winner_token() {
    let pool = test_pool().await;
    connected_artist(&pool, Provider::Instagram, -60).await;
    let stale = store::load_tokens(&pool, Provider::Instagram, "A_1")
        .await
        .unwrap()
        .unwrap();

    // Winner writes first
    let winner = ProviderTokens {
        access_token: "winner-token".to_string(),
        refresh_token: None,
        expires_in: 3600,
    };
    let winner_expiry = (Utc::now() + Duration::hours(1)).to_rfc3339();
    assert!(store::save_refreshed(
        &pool,
        Provider::Instagram,
        "A_1",
        &winner,
        &winner_expiry,
        stale.expiry.as_deref()
    )
    .await
    .unwrap());

    // Loser's write is conditioned on the expiry it read and must not apply
    let loser = ProviderTokens {
        access_token: "loser-token".to_string(),
        refresh_token: None,
        expires_in: 3600,
    };
    let applied = store::save_refreshed(
        &pool,
        Provider::Instagram,
        "A_1",
        &loser,
        &winner_expiry,
        stale.expiry.as_deref(),
    )
    .await
    .unwrap();
    assert!(!applied);

    let stored = store::load_tokens(&pool, Provider::Instagram, "A_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("winner-token"));
}

#[tokio::test]
async fn test_disconnect_clears_everything_and_blocks_refresh() {
    let pool = test_pool().await;
    connected_artist(&pool, Provider::Instagram, -60).await;

    assert!(store::disconnect(&pool, Provider::Instagram, "A_1").await.unwrap());

    let row: (Option<String>, Option<String>, Option<String>, Option<String>, Option<String>) =
        sqlx::query_as(
            "SELECT instagram_access_token, instagram_token_expiry, instagram_id, instagram_username, instagram_connected_at FROM artists WHERE id = 'A_1'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row, (None, None, None, None, None));

    let provider = FakeProvider::new(Provider::Instagram).refreshing_to(ProviderTokens {
        access_token: "should-not-appear".to_string(),
        refresh_token: None,
        expires_in: 3600,
    });
    let token = get_valid_token_at(&pool, &provider, "A_1", Utc::now()).await.unwrap();
    assert!(token.is_none());
    assert_eq!(provider.refresh_calls(), 0);
}

#[tokio::test]
async fn test_instagram_sync_dedupes_against_stored_urls() {
    let pool = test_pool().await;
    connected_artist(&pool, Provider::Instagram, 3600).await;

    sqlx::query(
        "INSERT INTO videos (id, user_id, title, url, is_short, source, is_approved) VALUES ('V_OLD', 'U_1', 'Old', 'https://www.instagram.com/reel/one/', 1, 'instagram', 1)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let provider = FakeProvider::new(Provider::Instagram).with_media(vec![
        reel("https://www.instagram.com/reel/one/", "REEL"),
        reel("https://www.instagram.com/reel/two/", "VIDEO"),
        reel("https://www.instagram.com/reel/three/", "REEL"),
        reel("https://www.instagram.com/p/photo/", "IMAGE"),
    ]);

    let report = syncer::sync(&pool, &provider, "A_1").await.unwrap();
    assert_eq!(
        report,
        syncer::SyncReport {
            synced: 2,
            skipped: 1,
            total: 3
        }
    );

    // Imported videos wait for moderation
    let pending: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM videos WHERE user_id = 'U_1' AND source = 'instagram' AND is_approved = 0 AND is_short = 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 2);

    // Running again imports nothing new
    let again = syncer::sync(&pool, &provider, "A_1").await.unwrap();
    assert_eq!(again.synced, 0);
    assert_eq!(again.skipped, again.total);
}

#[tokio::test]
async fn test_sync_without_connection_asks_to_reconnect() {
    let pool = test_pool().await;
    fixtures::insert_artist(&pool, "A_1", "U_1").await;
    let provider = FakeProvider::new(Provider::YouTube);

    let result = syncer::sync(&pool, &provider, "A_1").await;
    match result {
        Err(crate::common::ApiError::BadRequest(msg)) => assert!(msg.contains("reconnect your YouTube")),
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_stale_state_never_exchanges_or_persists() {
    let pool = test_pool().await;
    fixtures::insert_artist(&pool, "A_1", "U_1").await;
    let provider = FakeProvider::new(Provider::Instagram);

    let now = Utc::now();
    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some(encode_state(SECRET, "U_1", Provider::Instagram, now - Duration::minutes(20)).unwrap()),
        error: None,
    };

    let outcome = complete_connection(&pool, &provider, SECRET, &params, now).await;
    assert_eq!(outcome, Err("state_expired"));
    assert_eq!(provider.exchange_calls(), 0);

    let stored = store::load_tokens(&pool, Provider::Instagram, "A_1")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.access_token.is_none());
}

#[tokio::test]
async fn test_hand_built_state_cannot_bind_another_users_artist() {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

    let pool = test_pool().await;
    fixtures::insert_artist(&pool, "A_VICTIM", "U_VICTIM").await;
    let provider = FakeProvider::new(Provider::Instagram);
    let now = Utc::now();

    let unsigned = URL_SAFE_NO_PAD.encode(format!(
        r#"{{"user_id":"U_VICTIM","provider":"instagram","timestamp":{}}}"#,
        now.timestamp_millis()
    ));
    let wrong_key = encode_state("guessed_secret", "U_VICTIM", Provider::Instagram, now).unwrap();

    for forged in [unsigned, wrong_key] {
        let params = CallbackParams {
            code: Some("attacker-code".to_string()),
            state: Some(forged),
            error: None,
        };
        assert_eq!(
            complete_connection(&pool, &provider, SECRET, &params, now).await,
            Err("invalid_state")
        );
    }

    assert_eq!(provider.exchange_calls(), 0);
    let status = store::connection_status(&pool, "A_VICTIM").await.unwrap();
    assert!(!status.instagram.connected);
}

#[tokio::test]
async fn test_state_for_other_provider_is_rejected() {
    let pool = test_pool().await;
    fixtures::insert_artist(&pool, "A_1", "U_1").await;
    let provider = FakeProvider::new(Provider::Instagram);

    let now = Utc::now();
    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some(encode_state(SECRET, "U_1", Provider::YouTube, now).unwrap()),
        error: None,
    };

    assert_eq!(
        complete_connection(&pool, &provider, SECRET, &params, now).await,
        Err("provider_mismatch")
    );
    assert_eq!(provider.exchange_calls(), 0);
}

#[tokio::test]
async fn test_valid_callback_stores_connection() {
    let pool = test_pool().await;
    fixtures::insert_artist(&pool, "A_1", "U_1").await;
    let provider = FakeProvider::new(Provider::YouTube);

    let now = Utc::now();
    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some(encode_state(SECRET, "U_1", Provider::YouTube, now).unwrap()),
        error: None,
    };

    complete_connection(&pool, &provider, SECRET, &params, now).await.unwrap();
    assert_eq!(provider.exchange_calls(), 1);

    let status = store::connection_status(&pool, "A_1").await.unwrap();
    assert!(status.youtube.connected);
    assert_eq!(status.youtube.account_id.as_deref(), Some("acct-1"));
    assert!(!status.instagram.connected);
}

#[tokio::test]
async fn test_callback_for_user_without_artist_profile() {
    let pool = test_pool().await;
    fixtures::insert_user(&pool, "U_9", "fan@test.com", "user").await;
    let provider = FakeProvider::new(Provider::YouTube);

    let now = Utc::now();
    let params = CallbackParams {
        code: Some("auth-code".to_string()),
        state: Some(encode_state(SECRET, "U_9", Provider::YouTube, now).unwrap()),
        error: None,
    };

    assert_eq!(
        complete_connection(&pool, &provider, SECRET, &params, now).await,
        Err("no_artist_profile")
    );
    assert_eq!(provider.exchange_calls(), 0);
}
