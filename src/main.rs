// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::PathBuf;
use std::time::Duration;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod admin;
mod artists;
mod auth;
mod bookings;
mod bookmarks;
mod common;
mod integrations;
mod logging_middleware;
mod services;
mod videos;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::dev_mode::{apply_cli_override, log_dev_mode_status, DevModeConfig};
use common::{AppConfig, AppState};
use services::{InstagramProvider, OAuthProvider, Provider, ProviderRegistry, YouTubeProvider};

/// Provider calls share one client
const HTTP_TIMEOUT_SECS: u64 = 30;

fn build_providers(config: &AppConfig, http: &Client) -> ProviderRegistry {
    let youtube = config.google.clone().map(|google| {
        Arc::new(YouTubeProvider::new(
            http.clone(),
            google,
            config.integration_redirect_uri(Provider::YouTube.as_str()),
        )) as Arc<dyn OAuthProvider>
    });
    let instagram = config.instagram.clone().map(|instagram| {
        Arc::new(InstagramProvider::new(
            http.clone(),
            instagram,
            config.integration_redirect_uri(Provider::Instagram.as_str()),
        )) as Arc<dyn OAuthProvider>
    });

    if youtube.is_none() {
        warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, YouTube integration disabled");
    }
    if instagram.is_none() {
        warn!("INSTAGRAM_APP_ID/INSTAGRAM_APP_SECRET not set, Instagram integration disabled");
    }

    ProviderRegistry { youtube, instagram }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::PATCH,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true)
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    info!(
        admin_email_count = config.admin_emails.len(),
        frontend_url = %config.frontend_url,
        sms_configured = config.sms.is_some(),
        aws_configured = config.aws.is_some(),
        "Configuration loaded"
    );

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    log_dev_mode_status(&dev_mode);

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    if let Some(path_part) = config.database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            let db_path = PathBuf::from(path_without_params);
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    common::migrations::run_migrations(&pool).await?;

    if dev_mode.is_enabled() {
        dev_mode.ensure_dev_user(&pool).await?;
    }

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let http_client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()?;

    let providers = build_providers(&config, &http_client);
    let cors = cors_layer(&config.cors_origins);
    let port = config.port;

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState::new(pool, http_client, config, dev_mode).with_providers(providers);
    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(auth::auth_routes())
        .merge(artists::artists_routes())
        .merge(bookings::bookings_routes())
        .merge(videos::videos_routes())
        .merge(bookmarks::bookmarks_routes())
        .merge(admin::admin_routes())
        // Request/response body logging in debug mode
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
