// src/common/migrations.rs
//! Database migration and schema management

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Run all database migrations
///
/// Tables are created if missing. Setting `RESET_DB=true` drops everything
/// first, which is only meant for local development.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("⚠️  RESET_DB=true - Dropping all tables and recreating schema...");
        drop_all_tables(pool).await?;
        info!("✅ Dropped old tables");
    }

    create_account_tables(pool).await?;
    create_artist_tables(pool).await?;
    create_content_tables(pool).await?;
    create_booking_tables(pool).await?;
    create_indexes(pool).await?;

    info!("✅ Database migration completed successfully!");
    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Reverse dependency order
    let tables = vec![
        "bookmarks",
        "bookings",
        "videos",
        "artists",
        "verification_tokens",
        "users",
    ];

    for table in tables {
        let _ = sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await;
    }

    Ok(())
}

async fn create_account_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            name TEXT,
            avatar TEXT,
            role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'artist', 'admin')),
            password_hash TEXT,
            provider TEXT,
            provider_id TEXT,
            phone TEXT,
            phone_verified INTEGER NOT NULL DEFAULT 0,
            email_verified INTEGER NOT NULL DEFAULT 0,
            reset_token TEXT,
            reset_token_expiry TEXT,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // OTP and email verification; one live token per identifier
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS verification_tokens (
            id TEXT PRIMARY KEY,
            identifier TEXT NOT NULL,
            token TEXT NOT NULL,
            purpose TEXT NOT NULL CHECK (purpose IN ('phone_otp', 'email_verification')),
            expires_at TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Add attempts column to existing verification_tokens table if it doesn't exist
    let _ = sqlx::query("ALTER TABLE verification_tokens ADD COLUMN attempts INTEGER NOT NULL DEFAULT 0")
        .execute(pool)
        .await;

    Ok(())
}

async fn create_artist_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id TEXT PRIMARY KEY,
            user_id TEXT UNIQUE NOT NULL,
            stage_name TEXT NOT NULL,
            artist_type TEXT NOT NULL,
            bio TEXT,
            location TEXT,
            languages TEXT,
            price_min INTEGER,
            price_max INTEGER,
            youtube_access_token TEXT,
            youtube_refresh_token TEXT,
            youtube_token_expiry TEXT,
            youtube_channel_id TEXT,
            youtube_channel_title TEXT,
            youtube_connected_at TEXT,
            instagram_access_token TEXT,
            instagram_token_expiry TEXT,
            instagram_id TEXT,
            instagram_username TEXT,
            instagram_connected_at TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
            CHECK (youtube_access_token IS NULL OR youtube_channel_id IS NOT NULL),
            CHECK (instagram_access_token IS NULL OR instagram_id IS NOT NULL)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_content_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            url TEXT NOT NULL,
            thumbnail_url TEXT,
            storage_key TEXT,
            duration_seconds INTEGER,
            is_short INTEGER NOT NULL DEFAULT 0,
            source TEXT NOT NULL DEFAULT 'upload' CHECK (source IN ('upload', 'youtube', 'instagram')),
            is_approved INTEGER NOT NULL DEFAULT 0,
            views INTEGER NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            artist_id TEXT,
            video_id TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY(artist_id) REFERENCES artists(id) ON DELETE CASCADE,
            FOREIGN KEY(video_id) REFERENCES videos(id) ON DELETE CASCADE,
            CHECK ((artist_id IS NULL) <> (video_id IS NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_booking_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            client_id TEXT NOT NULL,
            artist_id TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING'
                CHECK (status IN ('PENDING', 'APPROVED', 'DECLINED', 'CANCELLED', 'COMPLETED')),
            event_date TEXT NOT NULL,
            event_type TEXT NOT NULL,
            location TEXT NOT NULL,
            price INTEGER NOT NULL DEFAULT 0,
            notes TEXT,
            created_at TEXT DEFAULT (datetime('now')),
            updated_at TEXT DEFAULT (datetime('now')),
            FOREIGN KEY(client_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY(artist_id) REFERENCES artists(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = vec![
        // Account indexes
        "CREATE INDEX IF NOT EXISTS idx_users_provider ON users(provider, provider_id)",
        "CREATE INDEX IF NOT EXISTS idx_users_reset_token ON users(reset_token)",
        "CREATE INDEX IF NOT EXISTS idx_verification_tokens_identifier ON verification_tokens(identifier, purpose)",

        // Artist indexes
        "CREATE INDEX IF NOT EXISTS idx_artists_type ON artists(artist_type)",

        // Video indexes; the unique index backs sync dedupe against concurrent inserts
        "CREATE INDEX IF NOT EXISTS idx_videos_public ON videos(is_approved, is_short, created_at)",
        "CREATE INDEX IF NOT EXISTS idx_videos_user ON videos(user_id, source, is_short)",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_videos_user_source_url ON videos(user_id, source, url)",

        // Booking indexes
        "CREATE INDEX IF NOT EXISTS idx_bookings_artist_status ON bookings(artist_id, status)",
        "CREATE INDEX IF NOT EXISTS idx_bookings_client ON bookings(client_id, created_at)",

        // Bookmark uniqueness per (user, target)
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_bookmarks_user_artist ON bookmarks(user_id, artist_id) WHERE artist_id IS NOT NULL",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_bookmarks_user_video ON bookmarks(user_id, video_id) WHERE video_id IS NOT NULL",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    Ok(())
}

/// In-memory database with the full schema, for tests
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // A single connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();

    create_account_tables(&pool).await.unwrap();
    create_artist_tables(&pool).await.unwrap();
    create_content_tables(&pool).await.unwrap();
    create_booking_tables(&pool).await.unwrap();
    create_indexes(&pool).await.unwrap();

    pool
}

/// Test fixtures shared by the feature modules
#[cfg(test)]
pub mod fixtures {
    use sqlx::SqlitePool;

    pub async fn insert_user(pool: &SqlitePool, id: &str, email: &str, role: &str) {
        sqlx::query("INSERT INTO users (id, email, name, role) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(email)
            .bind("Test User")
            .bind(role)
            .execute(pool)
            .await
            .unwrap();
    }

    pub async fn insert_artist(pool: &SqlitePool, artist_id: &str, user_id: &str) {
        insert_user(pool, user_id, &format!("{}@artists.test", user_id.to_lowercase()), "artist")
            .await;
        sqlx::query(
            "INSERT INTO artists (id, user_id, stage_name, artist_type, languages) VALUES (?, ?, ?, 'singer', '[\"Hindi\"]')",
        )
        .bind(artist_id)
        .bind(user_id)
        .bind(format!("Stage {}", artist_id))
        .execute(pool)
        .await
        .unwrap();
    }

    pub async fn insert_booking(
        pool: &SqlitePool,
        booking_id: &str,
        client_id: &str,
        artist_id: &str,
        status: &str,
    ) {
        sqlx::query(
            "INSERT INTO bookings (id, client_id, artist_id, status, event_date, event_type, location, price) VALUES (?, ?, ?, ?, '2030-01-15', 'Wedding', 'Mumbai', 50000)",
        )
        .bind(booking_id)
        .bind(client_id)
        .bind(artist_id)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    }

    pub async fn insert_video(
        pool: &SqlitePool,
        video_id: &str,
        user_id: &str,
        url: &str,
        is_approved: bool,
        is_short: bool,
    ) {
        sqlx::query(
            "INSERT INTO videos (id, user_id, title, url, is_short, source, is_approved) VALUES (?, ?, ?, ?, ?, 'upload', ?)",
        )
        .bind(video_id)
        .bind(user_id)
        .bind(format!("Video {}", video_id))
        .bind(url)
        .bind(is_short)
        .bind(is_approved)
        .execute(pool)
        .await
        .unwrap();
    }
}
