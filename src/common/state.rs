// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::common::dev_mode::DevModeConfig;
use crate::services::{AwsService, ProviderRegistry, SmsService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub config: Arc<AppConfig>,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub dev_mode: DevModeConfig,
    pub aws_service: Arc<AwsService>,
    pub sms_service: Arc<SmsService>,
    pub providers: ProviderRegistry,
}

impl AppState {
    pub fn new(db: SqlitePool, http: Client, config: AppConfig, dev_mode: DevModeConfig) -> Self {
        let aws_service = Arc::new(AwsService::new(config.aws.clone()));
        let sms_service = Arc::new(SmsService::new(http.clone(), config.sms.clone()));

        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
            admin_emails: config.admin_emails.clone(),
            http,
            config: Arc::new(config),
            dev_mode,
            aws_service,
            sms_service,
            providers: ProviderRegistry::default(),
        }
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    /// Admin by stored role or by the ADMIN_EMAILS allow-list
    pub fn is_admin(&self, email: &str, role: &str) -> bool {
        role == "admin" || self.admin_emails.contains(&email.to_lowercase())
    }
}

#[cfg(test)]
impl AppState {
    /// State over an in-memory database with no external services configured
    pub async fn for_tests() -> Self {
        let db = crate::common::migrations::test_pool().await;
        Self::new(
            db,
            Client::new(),
            AppConfig::for_tests(),
            DevModeConfig::disabled(),
        )
    }
}
