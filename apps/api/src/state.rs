use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::storage::resume::UploadConfig;
use crate::storage::FileStore;
use crate::store::{ApplicationRepository, JobRepository, UserRepository};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub jobs: Arc<dyn JobRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub files: Arc<dyn FileStore>,
    /// Resume upload limits; handlers that accept files extract it directly.
    pub upload: UploadConfig,
    /// Signs and verifies the session cookie.
    pub cookie_key: Key,
    pub settings: Settings,
}

/// Request-time settings that are not part of any single service.
#[derive(Debug, Clone)]
pub struct Settings {
    pub admin_code: String,
    pub cookie_secure: bool,
}
