// src/common/config.rs
//! Process configuration read once from the environment at startup

use std::collections::HashSet;
use std::env;

/// Google OAuth client used for ID-token login and the YouTube integration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Instagram (Meta) app credentials
#[derive(Debug, Clone)]
pub struct InstagramConfig {
    pub app_id: String,
    pub app_secret: String,
}

/// SMS provider credentials (Twilio-compatible REST API)
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub api_base: String,
}

/// AWS credentials for S3 uploads and SES email
#[derive(Debug, Clone)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub s3_bucket_name: String,
    pub cloudfront_domain: Option<String>,
    pub ses_from_email: String,
    pub ses_region: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub admin_emails: HashSet<String>,
    pub frontend_url: String,
    pub backend_url: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub google: Option<GoogleConfig>,
    pub instagram: Option<InstagramConfig>,
    pub sms: Option<SmsConfig>,
    pub aws: Option<AwsConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let admin_emails = parse_admin_emails(&env::var("ADMIN_EMAILS").unwrap_or_default());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let google = match (non_empty("GOOGLE_CLIENT_ID"), non_empty("GOOGLE_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let instagram = match (non_empty("INSTAGRAM_APP_ID"), non_empty("INSTAGRAM_APP_SECRET")) {
            (Some(app_id), Some(app_secret)) => Some(InstagramConfig { app_id, app_secret }),
            _ => None,
        };

        let sms = match (
            non_empty("TWILIO_ACCOUNT_SID"),
            non_empty("TWILIO_AUTH_TOKEN"),
            non_empty("TWILIO_FROM_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(SmsConfig {
                account_sid,
                auth_token,
                from_number,
                api_base: env::var("TWILIO_API_BASE")
                    .unwrap_or_else(|_| "https://api.twilio.com".to_string()),
            }),
            _ => None,
        };

        let aws = match (non_empty("AWS_ACCESS_KEY_ID"), non_empty("AWS_SECRET_ACCESS_KEY")) {
            (Some(access_key_id), Some(secret_access_key)) => {
                let region = env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
                Some(AwsConfig {
                    access_key_id,
                    secret_access_key,
                    ses_region: env::var("AWS_SES_REGION").unwrap_or_else(|_| region.clone()),
                    region,
                    s3_bucket_name: env::var("AWS_S3_BUCKET_NAME").unwrap_or_default(),
                    cloudfront_domain: non_empty("AWS_CLOUDFRONT_DOMAIN"),
                    ses_from_email: env::var("AWS_SES_FROM_EMAIL").unwrap_or_default(),
                })
            }
            _ => None,
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://andaction.db".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "replace_with_strong_secret".to_string()),
            admin_emails,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080),
            cors_origins,
            google,
            instagram,
            sms,
            aws,
        }
    }

    /// Redirect URI registered with the provider for an integration callback
    pub fn integration_redirect_uri(&self, provider: &str) -> String {
        format!(
            "{}/api/artists/integrations/{}/callback",
            self.backend_url.trim_end_matches('/'),
            provider
        )
    }

    /// Minimal configuration for tests
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test_secret".to_string(),
            admin_emails: HashSet::new(),
            frontend_url: "http://localhost:3000".to_string(),
            backend_url: "http://localhost:8080".to_string(),
            port: 0,
            cors_origins: Vec::new(),
            google: None,
            instagram: None,
            sms: None,
            aws: None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Comma-separated, case-insensitive admin email list
pub fn parse_admin_emails(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
