//! Resume binaries live behind `FileStore`, addressed by generated filename.

pub mod disk;
pub mod resume;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::AppError;

/// A stored object read back from the file store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub bytes: Bytes,
    pub content_type: String,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, name: &str, bytes: Bytes, content_type: &str) -> Result<(), AppError>;
    /// `Ok(None)` when no object exists under `name`.
    async fn get(&self, name: &str) -> Result<Option<StoredFile>, AppError>;
    async fn delete(&self, name: &str) -> Result<(), AppError>;
}
