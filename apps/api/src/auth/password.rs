use anyhow::anyhow;
use rand::Rng;
use tokio::task;

use crate::errors::AppError;

/// Hashes a password with argon2 on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let salt: [u8; 16] = rand::thread_rng().gen();
    task::spawn_blocking(move || {
        argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())
    })
    .await
    .map_err(|e| anyhow!("password hashing task failed: {e}"))?
    .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))
}

/// Checks a password against a stored hash. A malformed hash never matches.
pub async fn verify_password(encoded: &str, password: &str) -> Result<bool, AppError> {
    let encoded = encoded.to_owned();
    let password = password.to_owned();
    let matched = task::spawn_blocking(move || {
        argon2::verify_encoded(&encoded, password.as_bytes()).unwrap_or(false)
    })
    .await
    .map_err(|e| anyhow!("password verification task failed: {e}"))?;
    Ok(matched)
}
