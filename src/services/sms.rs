// src/services/sms.rs
//! Outbound SMS through a Twilio-compatible REST API

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::common::config::SmsConfig;
use crate::common::helpers::safe_phone_log;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS provider not configured")]
    NotConfigured,

    #[error("SMS request failed: {0}")]
    RequestFailed(String),
}

/// Outcome reported by the provider; `provider_response` is kept for logs only
#[derive(Debug, Clone, Serialize)]
pub struct SmsDelivery {
    pub success: bool,
    pub provider_response: String,
}

#[derive(Debug, Clone)]
pub struct SmsService {
    client: Client,
    config: Option<SmsConfig>,
}

impl SmsService {
    pub fn new(client: Client, config: Option<SmsConfig>) -> Self {
        Self { client, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub async fn send(&self, to: &str, message: &str) -> Result<SmsDelivery, SmsError> {
        let config = self.config.as_ref().ok_or(SmsError::NotConfigured)?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base.trim_end_matches('/'),
            config.account_sid
        );
        let params = [
            ("To", to),
            ("From", config.from_number.as_str()),
            ("Body", message),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&config.account_sid, Some(&config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %safe_phone_log(to), "Failed to reach SMS provider");
                SmsError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            info!(to = %safe_phone_log(to), "SMS accepted by provider");
        } else {
            warn!(
                to = %safe_phone_log(to),
                status = %status,
                provider_response = %body,
                "SMS rejected by provider"
            );
        }

        Ok(SmsDelivery {
            success: status.is_success(),
            provider_response: body,
        })
    }
}
