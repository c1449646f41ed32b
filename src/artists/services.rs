use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::models::*;
use super::validators::{check_prices, ProfileValidator};
use crate::common::{generate_artist_id, ApiError, Page, Paginated, ValidationResult, Validator};
use crate::videos::moderation;

fn push_list_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ArtistListQuery) {
    builder.push(" WHERE 1 = 1");

    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        builder
            .push(" AND stage_name LIKE ")
            .push_bind(format!("%{}%", q));
    }
    if let Some(artist_type) = query.artist_type.as_deref().filter(|t| !t.is_empty()) {
        builder
            .push(" AND LOWER(artist_type) = LOWER(")
            .push_bind(artist_type.to_string())
            .push(")");
    }
    if let Some(location) = query.location.as_deref().filter(|l| !l.is_empty()) {
        builder
            .push(" AND location LIKE ")
            .push_bind(format!("%{}%", location));
    }
    if let Some(language) = query.language.as_deref().filter(|l| !l.is_empty()) {
        // languages holds a JSON array of strings
        builder
            .push(" AND languages LIKE ")
            .push_bind(format!("%\"{}\"%", language));
    }
    if let Some(min_price) = query.min_price {
        builder
            .push(" AND (price_max IS NULL OR price_max >= ")
            .push_bind(min_price)
            .push(")");
    }
    if let Some(max_price) = query.max_price {
        builder
            .push(" AND (price_min IS NULL OR price_min <= ")
            .push_bind(max_price)
            .push(")");
    }
}

fn languages_json(languages: &[String]) -> Result<String, ApiError> {
    let trimmed: Vec<&str> = languages.iter().map(|l| l.trim()).collect();
    serde_json::to_string(&trimmed)
        .map_err(|e| ApiError::InternalServer(format!("Failed to encode languages: {}", e)))
}

pub struct ArtistsService {
    db: SqlitePool,
}

impl ArtistsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, query: &ArtistListQuery) -> Result<Paginated<Artist>, ApiError> {
        let page = Page::new(query.page, query.limit);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM artists");
        push_list_filters(&mut count, query);
        let (total,): (i64,) = count.build_query_as().fetch_one(&self.db).await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM artists", ARTIST_COLUMNS));
        push_list_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        let artists = select.build_query_as::<Artist>().fetch_all(&self.db).await?;

        Ok(Paginated::new(artists, total, page))
    }

    pub async fn get(&self, artist_id: &str) -> Result<Artist, ApiError> {
        sqlx::query_as::<_, Artist>(&format!("SELECT {} FROM artists WHERE id = ?", ARTIST_COLUMNS))
            .bind(artist_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| ApiError::NotFound("Artist not found".to_string()))
    }

    /// Profile with approved videos only
    pub async fn detail(&self, artist_id: &str) -> Result<ArtistDetail, ApiError> {
        let artist = self.get(artist_id).await?;
        let videos = moderation::approved_for_user(&self.db, &artist.user_id).await?;
        Ok(ArtistDetail { artist, videos })
    }

    pub async fn for_user(&self, user_id: &str) -> Result<Option<Artist>, ApiError> {
        let artist = sqlx::query_as::<_, Artist>(&format!(
            "SELECT {} FROM artists WHERE user_id = ?",
            ARTIST_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(artist)
    }

    /// Creates the caller's profile and promotes a plain user to the artist role
    pub async fn create(
        &self,
        user_id: &str,
        request: CreateArtistProfileRequest,
    ) -> Result<Artist, ApiError> {
        ProfileValidator.validate(&request).into_result()?;

        if self.for_user(user_id).await?.is_some() {
            return Err(ApiError::Conflict("Artist profile already exists".to_string()));
        }

        let artist_id = generate_artist_id();
        let languages = languages_json(&request.languages)?;

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO artists (id, user_id, stage_name, artist_type, bio, location, languages, price_min, price_max)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&artist_id)
        .bind(user_id)
        .bind(request.stage_name.trim())
        .bind(request.artist_type.trim())
        .bind(&request.bio)
        .bind(&request.location)
        .bind(&languages)
        .bind(request.price_min)
        .bind(request.price_max)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.to_string().contains("UNIQUE constraint failed") {
                ApiError::Conflict("Artist profile already exists".to_string())
            } else {
                ApiError::DatabaseError(e)
            }
        })?;

        sqlx::query("UPDATE users SET role = 'artist' WHERE id = ? AND role = 'user'")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(user_id = %user_id, artist_id = %artist_id, "Artist profile created");
        self.get(&artist_id).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        request: UpdateArtistProfileRequest,
    ) -> Result<Artist, ApiError> {
        ProfileValidator.validate(&request).into_result()?;

        let current = self
            .for_user(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Artist profile not found".to_string()))?;

        // The merged range must still be ordered
        let mut range = ValidationResult::new();
        check_prices(
            &mut range,
            request.price_min.or(current.price_min),
            request.price_max.or(current.price_max),
        );
        range.into_result()?;

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE artists SET updated_at = datetime('now')");
        if let Some(stage_name) = &request.stage_name {
            builder.push(", stage_name = ").push_bind(stage_name.trim().to_string());
        }
        if let Some(artist_type) = &request.artist_type {
            builder.push(", artist_type = ").push_bind(artist_type.trim().to_string());
        }
        if let Some(bio) = &request.bio {
            builder.push(", bio = ").push_bind(bio.clone());
        }
        if let Some(location) = &request.location {
            builder.push(", location = ").push_bind(location.clone());
        }
        if let Some(languages) = &request.languages {
            builder.push(", languages = ").push_bind(languages_json(languages)?);
        }
        if let Some(price_min) = request.price_min {
            builder.push(", price_min = ").push_bind(price_min);
        }
        if let Some(price_max) = request.price_max {
            builder.push(", price_max = ").push_bind(price_max);
        }
        builder.push(" WHERE id = ").push_bind(current.id.clone());

        builder.build().execute(&self.db).await?;

        info!(user_id = %user_id, artist_id = %current.id, "Artist profile updated");
        self.get(&current.id).await
    }
}
