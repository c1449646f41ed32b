// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing authentication for testing purposes

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

use crate::auth::models::User;

/// Fixed id so every request in dev mode resolves to the same account
pub const DEV_USER_ID: &str = "U_DEV000";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_name: String,
    pub user_role: String,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_email = env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@test.com".to_string());
        let user_name = env::var("DEV_USER_NAME").unwrap_or_else(|_| "Dev User".to_string());

        let user_role = match env::var("DEV_USER_ROLE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "artist" => "artist",
            "admin" => "admin",
            _ => "user",
        }
        .to_string();

        Self {
            enabled,
            user_email,
            user_name,
            user_role,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            user_email: "dev@test.com".to_string(),
            user_name: "Dev User".to_string(),
            user_role: "user".to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn create_dev_user(&self) -> User {
        User {
            id: DEV_USER_ID.to_string(),
            email: self.user_email.clone(),
            name: Some(self.user_name.clone()),
            avatar: None,
            role: self.user_role.clone(),
            password_hash: None,
            provider: Some("dev".to_string()),
            provider_id: Some(DEV_USER_ID.to_string()),
            phone: None,
            phone_verified: false,
            email_verified: true,
            reset_token: None,
            reset_token_expiry: None,
            created_at: None,
        }
    }

    /// Bookings, videos and bookmarks reference users, so the dev account must exist
    pub async fn ensure_dev_user(&self, db: &SqlitePool) -> Result<(), sqlx::Error> {
        if !self.enabled {
            return Ok(());
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, provider, provider_id, email_verified)
            VALUES (?, ?, ?, ?, 'dev', ?, 1)
            ON CONFLICT(id) DO UPDATE SET role = excluded.role, name = excluded.name
            "#,
        )
        .bind(DEV_USER_ID)
        .bind(&self.user_email)
        .bind(&self.user_name)
        .bind(&self.user_role)
        .bind(DEV_USER_ID)
        .execute(db)
        .await?;

        info!(user_id = DEV_USER_ID, role = %self.user_role, "Dev user ready");
        Ok(())
    }
}

/// Log dev mode status on startup
pub fn log_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        warn!("🔓 DEV MODE ENABLED - authentication bypassed, DO NOT USE IN PRODUCTION");
        warn!(
            email = %config.user_email,
            name = %config.user_name,
            role = %config.user_role,
            "Requests act as the dev user"
        );
    } else {
        info!("🔒 Production mode - Authentication required");
    }
}

/// `--dev` / `--prod` flags override DEV_MODE
pub fn parse_dev_mode_args<I: IntoIterator<Item = String>>(args: I) -> Option<bool> {
    let mut result = None;
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => result = Some(true),
            "--no-dev" | "--prod" | "--production" => result = Some(false),
            _ => {}
        }
    }
    result
}

pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        info!(dev_mode = cli_dev_mode, "CLI override for DEV_MODE");
        config.enabled = cli_dev_mode;
    }
    config
}
