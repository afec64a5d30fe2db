mod admin;
mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod models;
mod pagination;
mod routes;
mod state;
mod storage;
mod store;
mod users;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum_extra::extract::cookie::Key;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StorageBackend};
use crate::db::{create_pool, run_migrations};
use crate::routes::build_router;
use crate::state::{AppState, Settings};
use crate::storage::disk::DiskFileStore;
use crate::storage::resume::UploadConfig;
use crate::storage::s3::S3FileStore;
use crate::storage::FileStore;
use crate::store::postgres::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Board API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;
    let store = Arc::new(PgStore::new(db));

    // Initialize resume storage
    let files = build_file_store(&config).await?;

    let state = AppState {
        users: store.clone(),
        jobs: store.clone(),
        applications: store,
        files,
        upload: UploadConfig::new(config.max_upload_bytes),
        cookie_key: Key::derive_from(config.cookie_secret.as_bytes()),
        settings: Settings {
            admin_code: config.admin_code.clone(),
            cookie_secure: config.cookie_secure,
        },
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_file_store(config: &Config) -> Result<Arc<dyn FileStore>> {
    let files: Arc<dyn FileStore> = match &config.storage {
        StorageBackend::Disk { upload_dir } => {
            let store = DiskFileStore::new(upload_dir.as_str())
                .await
                .with_context(|| format!("failed to prepare upload directory {upload_dir}"))?;
            info!("Storing resumes on disk under {upload_dir}");
            Arc::new(store)
        }
        StorageBackend::S3 {
            bucket,
            endpoint,
            access_key_id,
            secret_access_key,
        } => Arc::new(
            S3FileStore::connect(endpoint, bucket, access_key_id, secret_access_key).await,
        ),
    };
    Ok(files)
}

/// Credentialed CORS for the configured front-end origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::PUT,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
