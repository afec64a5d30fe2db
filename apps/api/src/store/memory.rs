use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::{Job, JobQuery, JobSort, JobStatus};
use crate::models::user::{Role, User};
use crate::store::{ApplicationRepository, JobRepository, UserRepository};

/// In-memory repositories for tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    jobs: RwLock<HashMap<Uuid, Job>>,
    applications: RwLock<Vec<Application>>,
}

impl MemoryStore {
    pub async fn application_count(&self) -> usize {
        self.applications.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::validation("Email already in use"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        if let Some(existing) = self.users.write().await.get_mut(&user.id) {
            *existing = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn delete_non_admins(&self) -> Result<u64, AppError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|_, u| u.role == Role::Admin);
        Ok((before - users.len()) as u64)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.role == role)
            .count() as u64)
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn insert(&self, job: &Job) -> Result<(), AppError> {
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn update(&self, job: &Job) -> Result<(), AppError> {
        if let Some(existing) = self.jobs.write().await.get_mut(&job.id) {
            *existing = job.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.jobs.write().await.remove(&id).is_some())
    }

    async fn list(&self, query: &JobQuery) -> Result<(Vec<Job>, u64), AppError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| query.matches(j))
            .cloned()
            .collect();
        match query.sort {
            JobSort::Newest => jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            JobSort::Oldest => jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            JobSort::CompanyAsc => jobs.sort_by(|a, b| a.company.cmp(&b.company)),
            JobSort::CompanyDesc => jobs.sort_by(|a, b| b.company.cmp(&a.company)),
        }
        let total = jobs.len() as u64;
        let page = jobs
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_by_owner(&self, recruiter_id: Uuid) -> Result<Vec<Job>, AppError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.created_by == recruiter_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    async fn count_by_status(&self, status: Option<JobStatus>) -> Result<u64, AppError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| status.map_or(true, |s| s == j.job_status))
            .count() as u64)
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, AppError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .map(|j| j.created_at)
            .filter(|created| *created >= since)
            .collect())
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn insert(&self, application: &Application) -> Result<(), AppError> {
        self.applications.write().await.push(application.clone());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_by_applicant_and_job(
        &self,
        applicant_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .find(|a| a.applicant_id == applicant_id && a.job_id == job_id)
            .cloned())
    }

    async fn list_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>, AppError> {
        Ok(self
            .applications
            .read()
            .await
            .iter()
            .filter(|a| a.applicant_id == applicant_id)
            .cloned()
            .collect())
    }

    async fn list_by_recruiter(
        &self,
        recruiter_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> Result<(Vec<Application>, u64), AppError> {
        let mut matching: Vec<Application> = self
            .applications
            .read()
            .await
            .iter()
            .filter(|a| a.recruiter_id == recruiter_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if let Some(app) = self
            .applications
            .write()
            .await
            .iter_mut()
            .find(|a| a.id == id)
        {
            app.status = status;
            app.updated_at = updated_at;
        }
        Ok(())
    }

    async fn reject_pending_for_job(&self, job_id: Uuid) -> Result<u64, AppError> {
        let mut rejected = 0;
        for app in self.applications.write().await.iter_mut() {
            if app.job_id == job_id && app.status == ApplicationStatus::Pending {
                app.status = ApplicationStatus::Rejected;
                app.updated_at = Utc::now();
                rejected += 1;
            }
        }
        Ok(rejected)
    }

    async fn delete_for_job(&self, job_id: Uuid) -> Result<u64, AppError> {
        let mut apps = self.applications.write().await;
        let before = apps.len();
        apps.retain(|a| a.job_id != job_id);
        Ok((before - apps.len()) as u64)
    }
}
