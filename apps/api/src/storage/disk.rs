use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::storage::{FileStore, StoredFile};

/// Keeps uploads as plain files under one directory.
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, AppError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| AppError::Storage(format!("cannot create {}: {e}", root.display())))?;
        info!("Disk file store rooted at {}", root.display());
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, AppError> {
        // names are generated server-side; refuse anything that escapes the root
        let candidate = Path::new(name);
        if name.is_empty()
            || candidate.components().count() != 1
            || candidate.file_name().is_none()
        {
            return Err(AppError::Storage(format!("invalid object name '{name}'")));
        }
        Ok(self.root.join(candidate))
    }
}

#[async_trait]
impl FileStore for DiskFileStore {
    async fn put(&self, name: &str, bytes: Bytes, _content_type: &str) -> Result<(), AppError> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {e}", path.display())))
    }

    async fn get(&self, name: &str) -> Result<Option<StoredFile>, AppError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(StoredFile {
                bytes: Bytes::from(bytes),
                content_type: mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string(),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("read {}: {e}", path.display()))),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), AppError> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("remove {}: {e}", path.display()))),
        }
    }
}
