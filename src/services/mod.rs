// src/services/mod.rs
//
// Clients for the external collaborators: object storage, email, SMS
// and the content providers artists connect

pub mod aws;
pub mod email;
pub mod instagram;
pub mod oauth;
pub mod sms;
pub mod youtube;

// Re-export commonly used types for convenience
pub use aws::AwsService;
pub use instagram::InstagramProvider;
pub use oauth::{OAuthProvider, Provider, ProviderRegistry};
pub use sms::SmsService;
pub use youtube::YouTubeProvider;
