//! Storage seams for users, jobs and applications.
//!
//! `AppState` holds each repository as an `Arc<dyn ...>`; production wires
//! the PostgreSQL store, tests wire the in-memory one.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::{Job, JobQuery, JobStatus};
use crate::models::user::{Role, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: &User) -> Result<(), AppError>;
    async fn find(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn update(&self, user: &User) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
    /// Removes every account whose role is not `admin`.
    async fn delete_non_admins(&self) -> Result<u64, AppError>;
    async fn count(&self) -> Result<u64, AppError>;
    async fn count_by_role(&self, role: Role) -> Result<u64, AppError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: &Job) -> Result<(), AppError>;
    async fn find(&self, id: Uuid) -> Result<Option<Job>, AppError>;
    async fn update(&self, job: &Job) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
    /// One page of jobs matching `query`, plus the total match count.
    async fn list(&self, query: &JobQuery) -> Result<(Vec<Job>, u64), AppError>;
    async fn list_by_owner(&self, recruiter_id: Uuid) -> Result<Vec<Job>, AppError>;
    async fn count_by_status(&self, status: Option<JobStatus>) -> Result<u64, AppError>;
    /// Creation timestamps of jobs created at or after `since`.
    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, AppError>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn insert(&self, application: &Application) -> Result<(), AppError>;
    async fn find(&self, id: Uuid) -> Result<Option<Application>, AppError>;
    async fn find_by_applicant_and_job(
        &self,
        applicant_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, AppError>;
    async fn list_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>, AppError>;
    /// Newest first, one page, plus the total count for the recruiter.
    async fn list_by_recruiter(
        &self,
        recruiter_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> Result<(Vec<Application>, u64), AppError>;
    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
    /// Moves every pending application of a job to `rejected`.
    async fn reject_pending_for_job(&self, job_id: Uuid) -> Result<u64, AppError>;
    async fn delete_for_job(&self, job_id: Uuid) -> Result<u64, AppError>;
}
