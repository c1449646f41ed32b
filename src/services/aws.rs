// src/services/aws.rs
//! S3 object storage for uploaded videos and SES for transactional email

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sesv2::Client as SesClient;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::common::config::AwsConfig;
use crate::common::safe_email_log;

#[derive(Debug, Error)]
pub enum AwsError {
    #[error("AWS credentials not configured")]
    NotConfigured,

    #[error("S3 operation failed: {0}")]
    S3Error(String),

    #[error("SES operation failed: {0}")]
    SesError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[derive(Debug, Clone)]
pub struct AwsService {
    config: Option<AwsConfig>,
}

impl AwsService {
    pub fn new(config: Option<AwsConfig>) -> Self {
        Self { config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&AwsConfig, AwsError> {
        self.config.as_ref().ok_or(AwsError::NotConfigured)
    }

    async fn sdk_config(&self, region: &str) -> Result<aws_config::SdkConfig, AwsError> {
        let config = self.config()?;
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "environment",
        );

        Ok(aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials)
            .load()
            .await)
    }

    async fn s3_client(&self) -> Result<(S3Client, String), AwsError> {
        let config = self.config()?;
        if config.s3_bucket_name.is_empty() {
            return Err(AwsError::InvalidConfig(
                "S3 bucket name not configured".to_string(),
            ));
        }

        let sdk_config = self.sdk_config(&config.region).await?;
        Ok((S3Client::new(&sdk_config), config.s3_bucket_name.clone()))
    }

    async fn ses_client(&self) -> Result<SesClient, AwsError> {
        let config = self.config()?;
        let sdk_config = self.sdk_config(&config.ses_region).await?;
        Ok(SesClient::new(&sdk_config))
    }

    /// Upload an object and return its public URL
    pub async fn upload_file(
        &self,
        file_data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, AwsError> {
        let (client, bucket) = self.s3_client().await?;
        let size = file_data.len();

        client
            .put_object()
            .bucket(&bucket)
            .key(key)
            .body(ByteStream::from(Bytes::from(file_data)))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to upload object to S3");
                AwsError::S3Error(format!("Upload failed: {}", e))
            })?;

        info!(key = %key, bucket = %bucket, size_bytes = size, "Object uploaded to S3");
        self.file_url(key)
    }

    pub async fn delete_file(&self, key: &str) -> Result<(), AwsError> {
        let (client, bucket) = self.s3_client().await?;

        client
            .delete_object()
            .bucket(&bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key = %key, "Failed to delete S3 object");
                AwsError::S3Error(format!("Delete failed: {}", e))
            })?;

        debug!(key = %key, "Object deleted from S3");
        Ok(())
    }

    /// CloudFront URL when a distribution is configured, plain S3 URL otherwise
    pub fn file_url(&self, key: &str) -> Result<String, AwsError> {
        let config = self.config()?;
        Ok(object_url(config, key))
    }

    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> Result<(), AwsError> {
        use aws_sdk_sesv2::types::{Body as SesBody, Content, Destination, EmailContent, Message};

        let config = self.config()?;
        if config.ses_from_email.is_empty() {
            return Err(AwsError::InvalidConfig(
                "SES sender address not configured".to_string(),
            ));
        }
        let client = self.ses_client().await?;

        let destination = Destination::builder().to_addresses(to).build();

        let subject_content = Content::builder()
            .data(subject)
            .charset("UTF-8")
            .build()
            .map_err(|e| AwsError::SesError(format!("Failed to build subject: {}", e)))?;

        let body_content = Content::builder()
            .data(html)
            .charset("UTF-8")
            .build()
            .map_err(|e| AwsError::SesError(format!("Failed to build body: {}", e)))?;

        let message = Message::builder()
            .subject(subject_content)
            .body(SesBody::builder().html(body_content).build())
            .build();

        let result = client
            .send_email()
            .from_email_address(&config.ses_from_email)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, to = %safe_email_log(to), "Failed to send email via SES");
                AwsError::SesError(format!("Send failed: {}", e))
            })?;

        info!(
            to = %safe_email_log(to),
            message_id = ?result.message_id(),
            "Email sent via SES"
        );
        Ok(())
    }
}

fn object_url(config: &AwsConfig, key: &str) -> String {
    match &config.cloudfront_domain {
        Some(domain) => format!("https://{}/{}", domain.trim_end_matches('/'), key),
        None => format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            config.s3_bucket_name, config.region, key
        ),
    }
}
