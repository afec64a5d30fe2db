use anyhow::{bail, Context, Result};

const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost",
    "http://localhost:3000",
    "http://localhost:5173",
];

/// Where uploaded resumes are kept.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    Disk {
        upload_dir: String,
    },
    S3 {
        bucket: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
    },
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub cookie_secret: String,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
    pub storage: StorageBackend,
    pub max_upload_bytes: usize,
    pub admin_code: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let cookie_secret = require_env("COOKIE_SECRET")?;
        if cookie_secret.len() < 32 {
            bail!("COOKIE_SECRET must be at least 32 bytes long");
        }

        let storage = match optional_env("STORAGE_BACKEND").as_deref() {
            None | Some("disk") => StorageBackend::Disk {
                upload_dir: optional_env("UPLOAD_DIR")
                    .unwrap_or_else(|| "public/uploads".to_string()),
            },
            Some("s3") => StorageBackend::S3 {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            },
            Some(other) => bail!("STORAGE_BACKEND must be 'disk' or 's3', got '{other}'"),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            cookie_secret,
            cookie_secure: optional_env("COOKIE_SECURE").is_some_and(|v| v == "true"),
            cors_origins: parse_origins(optional_env("CORS_ORIGIN").as_deref()),
            storage,
            max_upload_bytes: optional_env("MAX_UPLOAD_BYTES")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MAX_UPLOAD_BYTES must be a byte count")?
                .unwrap_or(5 * 1024 * 1024),
            admin_code: optional_env("ADMIN_CODE").unwrap_or_else(|| "IAMADMIN".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Splits a comma separated origin list, falling back to the local dev origins.
pub fn parse_origins(raw: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect();
    if origins.is_empty() {
        DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
    } else {
        origins
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
