//! Application workflow: apply, list, review and resume download.
//!
//! Callers have already passed the role gate; these functions enforce the
//! ownership rules that depend on stored records.

use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus, ApplicationWithJob};
use crate::pagination::{self, Page};
use crate::state::AppState;
use crate::storage::resume::{self, display_name, ResumeUpload};

/// Apply form after field-level parsing.
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub applicant_id: Uuid,
    pub recruiter_id: Option<Uuid>,
    pub job_id: Uuid,
    pub status: Option<ApplicationStatus>,
    pub date_of_application: Option<NaiveDate>,
}

/// Resume bytes ready to stream back.
#[derive(Debug)]
pub struct ResumeDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

pub async fn apply(
    state: &AppState,
    caller: &Session,
    request: ApplyRequest,
    upload: ResumeUpload,
) -> Result<Application, AppError> {
    if request.applicant_id != caller.user_id {
        warn!(
            "user {} tried to apply on behalf of {}",
            caller.user_id, request.applicant_id
        );
        return Err(AppError::forbidden("You can only apply for yourself"));
    }
    if let Some(status) = request.status {
        if status != ApplicationStatus::Pending {
            return Err(AppError::validation("New applications must be pending"));
        }
    }

    let job = state
        .jobs
        .find(request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    if let Some(recruiter_id) = request.recruiter_id {
        if recruiter_id != job.created_by {
            return Err(AppError::validation("Recruiter does not match the job owner"));
        }
    }

    if state
        .applications
        .find_by_applicant_and_job(caller.user_id, job.id)
        .await?
        .is_some()
    {
        return Err(AppError::validation("Already Applied"));
    }

    let resume = match upload {
        ResumeUpload::Attached(file) => Some(resume::store(&state.files, file).await?),
        ResumeUpload::Absent => None,
    };

    let now = Utc::now();
    if let Some(sent) = request.date_of_application {
        if sent != now.date_naive() {
            debug!("client date {sent} replaced with {}", now.date_naive());
        }
    }
    let application = Application {
        id: Uuid::new_v4(),
        applicant_id: caller.user_id,
        recruiter_id: job.created_by,
        job_id: job.id,
        status: ApplicationStatus::Pending,
        date_of_application: now.date_naive(),
        resume,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = state.applications.insert(&application).await {
        if let Some(name) = &application.resume {
            if let Err(cleanup) = state.files.delete(name).await {
                error!("Failed to remove orphaned resume {name}: {cleanup}");
            }
        }
        return Err(e);
    }

    info!(
        "Application {} created: applicant={} job={} resume={}",
        application.id,
        application.applicant_id,
        application.job_id,
        application.resume.is_some()
    );
    Ok(application)
}

pub async fn list_for_applicant(
    state: &AppState,
    applicant_id: Uuid,
) -> Result<Vec<ApplicationWithJob>, AppError> {
    let applications = state.applications.list_by_applicant(applicant_id).await?;
    let mut views = Vec::with_capacity(applications.len());
    for application in applications {
        let job = state.jobs.find(application.job_id).await?;
        views.push(ApplicationWithJob {
            position: job.as_ref().map(|j| j.position.clone()),
            company: job.as_ref().map(|j| j.company.clone()),
            job_location: job.as_ref().map(|j| j.job_location.clone()),
            application,
        });
    }
    Ok(views)
}

pub async fn list_for_recruiter(
    state: &AppState,
    recruiter_id: Uuid,
    page: u32,
    limit: u32,
) -> Result<Page<Application>, AppError> {
    let offset = pagination::offset(page, limit);
    let (applications, total) = state
        .applications
        .list_by_recruiter(recruiter_id, limit, offset)
        .await?;
    Ok(Page::new(applications, total, page, limit))
}

pub async fn update_status(
    state: &AppState,
    caller: &Session,
    application_id: Uuid,
    status: ApplicationStatus,
) -> Result<Application, AppError> {
    let mut application = state
        .applications
        .find(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    if application.recruiter_id != caller.user_id {
        warn!(
            "recruiter {} tried to update application {} owned by {}",
            caller.user_id, application.id, application.recruiter_id
        );
        return Err(AppError::forbidden(
            "You are not authorized to update this application",
        ));
    }

    let now = Utc::now();
    state
        .applications
        .update_status(application.id, status, now)
        .await?;
    application.status = status;
    application.updated_at = now;

    info!("Application {} moved to {}", application.id, status.as_str());
    Ok(application)
}

pub async fn fetch_resume(
    state: &AppState,
    caller: &Session,
    application_id: Uuid,
) -> Result<ResumeDownload, AppError> {
    let application = state
        .applications
        .find(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;

    if caller.user_id != application.applicant_id && caller.user_id != application.recruiter_id {
        return Err(AppError::forbidden(
            "You are not a party to this application",
        ));
    }

    let stored_name = application
        .resume
        .ok_or_else(|| AppError::NotFound("No resume attached to this application".to_string()))?;

    let file = state
        .files
        .get(&stored_name)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume file not found".to_string()))?;

    Ok(ResumeDownload {
        file_name: display_name(&stored_name).to_string(),
        content_type: file.content_type,
        bytes: file.bytes,
    })
}
