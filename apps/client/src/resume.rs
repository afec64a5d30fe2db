use std::path::Path;

use crate::error::ClientError;

/// Content types the server accepts for a resume.
pub const ALLOWED_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// A resume read from disk and checked before upload.
#[derive(Debug, Clone)]
pub struct ResumeAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Guesses the content type from the extension and checks it is allowed.
pub fn content_type_for(path: &Path) -> Result<String, ClientError> {
    let guessed = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream");
    if ALLOWED_TYPES.contains(&guessed) {
        Ok(guessed.to_string())
    } else {
        Err(ClientError::Resume(
            "Only PDF and DOC files are allowed".to_string(),
        ))
    }
}

pub async fn load(path: &Path) -> Result<ResumeAttachment, ClientError> {
    let content_type = content_type_for(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("resume")
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::Resume(format!("Cannot read {}: {e}", path.display())))?;
    Ok(ResumeAttachment {
        file_name,
        content_type,
        bytes,
    })
}
