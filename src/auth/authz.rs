//! Authorization predicates shared by the feature modules

use sqlx::SqlitePool;
use tracing::warn;

use super::extractors::AuthedUser;
use crate::common::ApiError;

/// The requesting user together with their artist profile, if any
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub artist_id: Option<String>,
    pub is_admin: bool,
}

impl Actor {
    pub async fn load(db: &SqlitePool, authed: &AuthedUser) -> Result<Self, ApiError> {
        Ok(Self {
            user_id: authed.id.clone(),
            artist_id: artist_id_for_user(db, &authed.id).await?,
            is_admin: authed.is_admin,
        })
    }

    /// Artist id of the actor, or Forbidden when they have no artist profile
    pub fn require_artist(&self) -> Result<&str, ApiError> {
        self.artist_id.as_deref().ok_or_else(|| {
            warn!(user_id = %self.user_id, "Artist profile required");
            ApiError::Forbidden("Artist profile required".to_string())
        })
    }
}

pub async fn artist_id_for_user(db: &SqlitePool, user_id: &str) -> Result<Option<String>, ApiError> {
    let artist_id = sqlx::query_scalar::<_, String>("SELECT id FROM artists WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    Ok(artist_id)
}

/// Readable by the booking's client or by the artist it was made with
pub fn booking_access(actor: &Actor, client_id: &str, booking_artist_id: &str) -> bool {
    actor.user_id == client_id || owns_artist_profile(actor, booking_artist_id)
}

pub fn owns_artist_profile(actor: &Actor, artist_id: &str) -> bool {
    actor.artist_id.as_deref() == Some(artist_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(user_id: &str, artist_id: Option<&str>) -> Actor {
        Actor {
            user_id: user_id.to_string(),
            artist_id: artist_id.map(str::to_string),
            is_admin: false,
        }
    }

    #[test]
    fn test_booking_access() {
        let client = actor("U_CLIENT", None);
        let artist = actor("U_ARTIST", Some("A_1"));
        let stranger = actor("U_OTHER", Some("A_2"));

        assert!(booking_access(&client, "U_CLIENT", "A_1"));
        assert!(booking_access(&artist, "U_CLIENT", "A_1"));
        assert!(!booking_access(&stranger, "U_CLIENT", "A_1"));
    }

    #[test]
    fn test_require_artist() {
        assert!(matches!(
            actor("U_1", None).require_artist(),
            Err(ApiError::Forbidden(_))
        ));
        assert_eq!(actor("U_1", Some("A_1")).require_artist().unwrap(), "A_1");
    }

    #[tokio::test]
    async fn test_artist_id_lookup() {
        let pool = crate::common::migrations::test_pool().await;
        crate::common::migrations::fixtures::insert_artist(&pool, "A_1", "U_1").await;

        assert_eq!(
            artist_id_for_user(&pool, "U_1").await.unwrap().as_deref(),
            Some("A_1")
        );
        assert!(artist_id_for_user(&pool, "U_2").await.unwrap().is_none());
    }
}
