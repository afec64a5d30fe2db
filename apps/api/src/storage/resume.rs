//! Resume upload policy.
//!
//! A multipart `resume` part resolves to one of three outcomes:
//! `Ok(ResumeUpload::Attached)`, `Ok(ResumeUpload::Absent)` or
//! `Err(ResumeRejection)`. Only the last one fails the request.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::Utc;
use rand::Rng;

use crate::errors::AppError;
use crate::storage::FileStore;

pub const PDF: &str = "application/pdf";
pub const DOC: &str = "application/msword";
pub const DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Upload limits handed to the handlers that accept a resume.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub allowed_types: Vec<String>,
    pub max_bytes: usize,
}

impl UploadConfig {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            allowed_types: [PDF, DOC, DOCX].iter().map(|t| t.to_string()).collect(),
            max_bytes,
        }
    }
}

/// A file part as it arrived in the multipart body.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// An accepted resume, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub stored_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub enum ResumeUpload {
    Attached(ResumeFile),
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResumeRejection {
    #[error("Only PDF and DOC files are allowed")]
    UnsupportedType(String),
    #[error("Invalid file extension. Only PDF, DOC, DOCX are allowed")]
    UnsupportedExtension(String),
    #[error("Resume exceeds the maximum size of {limit} bytes")]
    TooLarge { size: usize, limit: usize },
}

impl From<ResumeRejection> for AppError {
    fn from(rejection: ResumeRejection) -> Self {
        AppError::validation(rejection.to_string())
    }
}

/// Multipart field that carries the resume file.
pub const RESUME_FIELD: &str = "resume";

/// Text fields and the optional resume part of a multipart form.
#[derive(Debug, Default)]
pub struct ResumeForm {
    pub fields: HashMap<String, String>,
    pub resume: Option<RawUpload>,
}

impl ResumeForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Drains a multipart body. Nothing is written anywhere; the resume part is
/// kept in memory until the request has been validated.
pub async fn read_form(mut multipart: Multipart) -> Result<ResumeForm, AppError> {
    let mut form = ResumeForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed form data: {}", e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == RESUME_FIELD {
            let file_name = field.file_name().map(String::from);
            let content_type = field.content_type().map(String::from);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read resume: {}", e.body_text())))?;
            form.resume = Some(RawUpload {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read {name}: {}", e.body_text())))?;
            form.fields.insert(name, value);
        }
    }
    Ok(form)
}

/// Decides what an optional resume part means for the request.
pub fn classify(
    part: Option<RawUpload>,
    config: &UploadConfig,
) -> Result<ResumeUpload, ResumeRejection> {
    let Some(part) = part else {
        return Ok(ResumeUpload::Absent);
    };

    let file_name = part
        .file_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    // browsers send an empty, nameless part when nothing was picked
    if file_name.is_none() && part.bytes.is_empty() {
        return Ok(ResumeUpload::Absent);
    }

    let content_type = part
        .content_type
        .as_deref()
        .map(|c| c.split(';').next().unwrap_or(c).trim().to_ascii_lowercase())
        .unwrap_or_default();
    if !config.allowed_types.iter().any(|t| *t == content_type) {
        return Err(ResumeRejection::UnsupportedType(content_type));
    }

    if let Some(ext) = file_name.and_then(extension) {
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ResumeRejection::UnsupportedExtension(ext));
        }
    }

    if part.bytes.len() > config.max_bytes {
        return Err(ResumeRejection::TooLarge {
            size: part.bytes.len(),
            limit: config.max_bytes,
        });
    }

    Ok(ResumeUpload::Attached(ResumeFile {
        stored_name: generate_name(file_name.unwrap_or("resume")),
        content_type,
        bytes: part.bytes,
    }))
}

fn extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// `<unix millis>-<random>-<sanitized original name>`
pub fn generate_name(original: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}-{}",
        Utc::now().timestamp_millis(),
        suffix,
        sanitize(original)
    )
}

fn sanitize(original: &str) -> String {
    // drop any client-side directory part
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Writes an accepted resume and returns the stored name.
pub async fn store(files: &Arc<dyn FileStore>, file: ResumeFile) -> Result<String, AppError> {
    files
        .put(&file.stored_name, file.bytes, &file.content_type)
        .await?;
    tracing::info!("Stored resume {}", file.stored_name);
    Ok(file.stored_name)
}

/// Original filename shown to the downloader: the generated prefix stripped.
pub fn display_name(stored_name: &str) -> &str {
    let mut parts = stored_name.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(millis), Some(rand), Some(rest))
            if millis.chars().all(|c| c.is_ascii_digit())
                && rand.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => stored_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>, content_type: Option<&str>, bytes: &'static [u8]) -> RawUpload {
        RawUpload {
            file_name: name.map(String::from),
            content_type: content_type.map(String::from),
            bytes: Bytes::from_static(bytes),
        }
    }

    fn config() -> UploadConfig {
        UploadConfig::new(1024)
    }

    #[test]
    fn test_missing_part_is_absent() {
        assert!(matches!(classify(None, &config()), Ok(ResumeUpload::Absent)));
    }

    #[test]
    fn test_empty_nameless_part_is_absent() {
        let part = upload(Some(""), Some("application/octet-stream"), b"");
        assert!(matches!(
            classify(Some(part), &config()),
            Ok(ResumeUpload::Absent)
        ));
    }

    #[test]
    fn test_each_allowed_type_attaches() {
        for (name, ct) in [("cv.pdf", PDF), ("cv.doc", DOC), ("cv.docx", DOCX)] {
            match classify(Some(upload(Some(name), Some(ct), b"data")), &config()) {
                Ok(ResumeUpload::Attached(file)) => {
                    assert_eq!(file.content_type, ct);
                    assert!(file.stored_name.ends_with(name));
                }
                other => panic!("{name}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_content_type_parameters_ignored() {
        let part = upload(Some("cv.pdf"), Some("Application/PDF; charset=binary"), b"x");
        assert!(matches!(
            classify(Some(part), &config()),
            Ok(ResumeUpload::Attached(_))
        ));
    }

    #[test]
    fn test_wrong_type_rejected_not_absent() {
        let part = upload(Some("photo.png"), Some("image/png"), b"\x89PNG");
        assert_eq!(
            classify(Some(part), &config()).unwrap_err(),
            ResumeRejection::UnsupportedType("image/png".into())
        );
    }

    #[test]
    fn test_missing_content_type_with_file_rejected() {
        let part = upload(Some("cv.pdf"), None, b"%PDF");
        assert!(matches!(
            classify(Some(part), &config()),
            Err(ResumeRejection::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_extension_mismatch_rejected() {
        let part = upload(Some("cv.exe"), Some(PDF), b"MZ");
        assert_eq!(
            classify(Some(part), &config()).unwrap_err(),
            ResumeRejection::UnsupportedExtension("exe".into())
        );
    }

    #[test]
    fn test_too_large_rejected() {
        let config = UploadConfig::new(3);
        let part = upload(Some("cv.pdf"), Some(PDF), b"%PDF-1.7");
        assert!(matches!(
            classify(Some(part), &config),
            Err(ResumeRejection::TooLarge { size: 8, limit: 3 })
        ));
    }

    #[test]
    fn test_rejection_message_is_validation_error() {
        let err: AppError = ResumeRejection::UnsupportedType("image/png".into()).into();
        match err {
            AppError::Validation(messages) => {
                assert_eq!(messages, vec!["Only PDF and DOC files are allowed"])
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_generated_name_shape() {
        let name = generate_name("../My CV (final).pdf");
        let parts: Vec<&str> = name.splitn(3, '-').collect();
        assert!(parts[0].parse::<i64>().is_ok());
        assert!(parts[1].parse::<u32>().unwrap() < 1_000_000_000);
        assert_eq!(parts[2], "My_CV__final_.pdf");
        assert_eq!(display_name(&name), "My_CV__final_.pdf");
    }

    #[test]
    fn test_display_name_passthrough() {
        assert_eq!(display_name("legacy-file.pdf"), "legacy-file.pdf");
    }
}
