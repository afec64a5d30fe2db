use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::job::{Job, JobQuery, JobStatus, JobType};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[validate(length(min = 5, max = 100, message = "Company name must be between 5 and 100 characters"))]
    pub company: String,
    #[validate(length(min = 3, max = 100, message = "Position must be between 3 and 100 characters"))]
    pub position: String,
    pub job_status: Option<JobStatus>,
    pub job_type: Option<JobType>,
    #[validate(length(min = 1, message = "Job location is required"))]
    pub job_location: String,
    #[validate(range(min = 1, message = "Job vacancy must be at least 1"))]
    pub job_vacancy: i32,
    #[validate(range(min = 0, message = "Job salary cannot be negative"))]
    pub job_salary: i64,
    pub job_deadline: NaiveDate,
    #[validate(length(min = 1, message = "Job description is required"))]
    pub job_description: String,
    #[validate(length(min = 1, message = "At least one skill is required"))]
    pub job_skills: Vec<String>,
    #[validate(length(min = 1, message = "At least one facility is required"))]
    pub job_facilities: Vec<String>,
    #[validate(length(min = 1, message = "Job contact is required"))]
    pub job_contact: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    #[validate(length(min = 5, max = 100, message = "Company name must be between 5 and 100 characters"))]
    pub company: Option<String>,
    #[validate(length(min = 3, max = 100, message = "Position must be between 3 and 100 characters"))]
    pub position: Option<String>,
    pub job_type: Option<JobType>,
    #[validate(length(min = 1, message = "Job location is required"))]
    pub job_location: Option<String>,
    #[validate(range(min = 1, message = "Job vacancy must be at least 1"))]
    pub job_vacancy: Option<i32>,
    #[validate(range(min = 0, message = "Job salary cannot be negative"))]
    pub job_salary: Option<i64>,
    pub job_deadline: Option<NaiveDate>,
    #[validate(length(min = 1, message = "Job description is required"))]
    pub job_description: Option<String>,
    #[validate(length(min = 1, message = "At least one skill is required"))]
    pub job_skills: Option<Vec<String>>,
    #[validate(length(min = 1, message = "At least one facility is required"))]
    pub job_facilities: Option<Vec<String>>,
    #[validate(length(min = 1, message = "Job contact is required"))]
    pub job_contact: Option<String>,
}

pub async fn list(state: &AppState, query: &JobQuery) -> Result<(Vec<Job>, u64), AppError> {
    state.jobs.list(query).await
}

pub async fn get(state: &AppState, id: Uuid) -> Result<Job, AppError> {
    state
        .jobs
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
}

/// Loads a job and checks the caller created it.
async fn owned(state: &AppState, caller: &Session, id: Uuid) -> Result<Job, AppError> {
    let job = get(state, id).await?;
    if job.created_by != caller.user_id {
        warn!("recruiter {} is not the owner of job {}", caller.user_id, job.id);
        return Err(AppError::forbidden("You are not the owner of this job"));
    }
    Ok(job)
}

pub async fn create(
    state: &AppState,
    caller: &Session,
    req: CreateJobRequest,
) -> Result<Job, AppError> {
    req.validate()?;

    let now = Utc::now();
    let job = Job {
        id: Uuid::new_v4(),
        company: req.company.trim().to_string(),
        position: req.position.trim().to_string(),
        job_status: req.job_status.unwrap_or(JobStatus::Pending),
        job_type: req.job_type.unwrap_or(JobType::FullTime),
        job_location: req.job_location.trim().to_string(),
        created_by: caller.user_id,
        job_vacancy: req.job_vacancy,
        job_salary: req.job_salary,
        job_deadline: req.job_deadline,
        job_description: req.job_description,
        job_skills: req.job_skills,
        job_facilities: req.job_facilities,
        job_contact: req.job_contact.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    state.jobs.insert(&job).await?;

    info!("Job {} created by {}", job.id, job.created_by);
    Ok(job)
}

pub async fn update(
    state: &AppState,
    caller: &Session,
    id: Uuid,
    req: UpdateJobRequest,
) -> Result<Job, AppError> {
    req.validate()?;
    let mut job = owned(state, caller, id).await?;

    if let Some(company) = req.company {
        job.company = company.trim().to_string();
    }
    if let Some(position) = req.position {
        job.position = position.trim().to_string();
    }
    if let Some(job_type) = req.job_type {
        job.job_type = job_type;
    }
    if let Some(location) = req.job_location {
        job.job_location = location.trim().to_string();
    }
    if let Some(vacancy) = req.job_vacancy {
        job.job_vacancy = vacancy;
    }
    if let Some(salary) = req.job_salary {
        job.job_salary = salary;
    }
    if let Some(deadline) = req.job_deadline {
        job.job_deadline = deadline;
    }
    if let Some(description) = req.job_description {
        job.job_description = description;
    }
    if let Some(skills) = req.job_skills {
        job.job_skills = skills;
    }
    if let Some(facilities) = req.job_facilities {
        job.job_facilities = facilities;
    }
    if let Some(contact) = req.job_contact {
        job.job_contact = contact.trim().to_string();
    }
    job.updated_at = Utc::now();
    state.jobs.update(&job).await?;

    info!("Job {} updated", job.id);
    Ok(job)
}

pub async fn delete(state: &AppState, caller: &Session, id: Uuid) -> Result<(), AppError> {
    let job = owned(state, caller, id).await?;
    let removed = state.applications.delete_for_job(job.id).await?;
    state.jobs.delete(job.id).await?;
    info!("Job {} deleted with {removed} applications", job.id);
    Ok(())
}

pub async fn list_for_owner(state: &AppState, caller: &Session) -> Result<Vec<Job>, AppError> {
    state.jobs.list_by_owner(caller.user_id).await
}

/// Moves a job to `status`; declining it rejects every pending application.
pub async fn update_status(
    state: &AppState,
    caller: &Session,
    id: Uuid,
    status: JobStatus,
) -> Result<Job, AppError> {
    let mut job = owned(state, caller, id).await?;
    job.job_status = status;
    job.updated_at = Utc::now();
    state.jobs.update(&job).await?;

    if status == JobStatus::Declined {
        let rejected = state.applications.reject_pending_for_job(job.id).await?;
        info!("Job {} declined, {rejected} pending applications rejected", job.id);
    } else {
        info!("Job {} moved to {}", job.id, status.as_str());
    }
    Ok(job)
}
