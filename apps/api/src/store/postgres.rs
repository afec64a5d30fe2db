use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{Application, ApplicationRow, ApplicationStatus};
use crate::models::job::{Job, JobQuery, JobRow, JobStatus};
use crate::models::user::{Role, User, UserRow};
use crate::store::{ApplicationRepository, JobRepository, UserRepository};

/// PostgreSQL-backed implementation of every repository trait.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `ILIKE` pattern matching `term` anywhere, with its own wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn decode<R, T>(row: R) -> Result<T, AppError>
where
    T: TryFrom<R, Error = String>,
{
    T::try_from(row).map_err(|e| AppError::Internal(anyhow!("corrupt row: {e}")))
}

fn decode_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, AppError>
where
    T: TryFrom<R, Error = String>,
{
    rows.into_iter().map(decode).collect()
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, username, email, password_hash, role, location, gender, resume,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.location)
        .bind(&user.gender)
        .bind(&user.resume)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // a concurrent registration took the email first
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::validation("Email already in use")
            }
            other => AppError::Database(other),
        })?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(decode).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(decode).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let rows: Vec<UserRow> = sqlx::query_as("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await?;
        decode_all(rows)
    }

    async fn update(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, location = $3, gender = $4, resume = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.location)
        .bind(&user.gender)
        .bind(&user.resume)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_non_admins(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE role <> 'admin'")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl JobRepository for PgStore {
    async fn insert(&self, job: &Job) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, company, position, job_status, job_type, job_location, created_by,
                 job_vacancy, job_salary, job_deadline, job_description, job_skills,
                 job_facilities, job_contact, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(job.id)
        .bind(&job.company)
        .bind(&job.position)
        .bind(job.job_status.as_str())
        .bind(job.job_type.as_str())
        .bind(&job.job_location)
        .bind(job.created_by)
        .bind(job.job_vacancy)
        .bind(job.job_salary)
        .bind(job.job_deadline)
        .bind(&job.job_description)
        .bind(&job.job_skills)
        .bind(&job.job_facilities)
        .bind(&job.job_contact)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Job>, AppError> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(decode).transpose()
    }

    async fn update(&self, job: &Job) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE jobs
            SET company = $2, position = $3, job_status = $4, job_type = $5,
                job_location = $6, job_vacancy = $7, job_salary = $8, job_deadline = $9,
                job_description = $10, job_skills = $11, job_facilities = $12,
                job_contact = $13, updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.company)
        .bind(&job.position)
        .bind(job.job_status.as_str())
        .bind(job.job_type.as_str())
        .bind(&job.job_location)
        .bind(job.job_vacancy)
        .bind(job.job_salary)
        .bind(job.job_deadline)
        .bind(&job.job_description)
        .bind(&job.job_skills)
        .bind(&job.job_facilities)
        .bind(&job.job_contact)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, query: &JobQuery) -> Result<(Vec<Job>, u64), AppError> {
        let pattern = query.search.as_deref().map(contains_pattern);
        let status = query.job_status.map(|s| s.as_str());
        let job_type = query.job_type.map(|t| t.as_str());
        let filter = r#"
            WHERE ($1::text IS NULL OR company ILIKE $1 OR position ILIKE $1)
              AND ($2::text IS NULL OR job_status = $2)
              AND ($3::text IS NULL OR job_type = $3)
        "#;

        // order_by() only yields fixed column expressions
        let sql = format!(
            "SELECT * FROM jobs {filter} ORDER BY {} LIMIT $4 OFFSET $5",
            query.sort.order_by()
        );
        let rows: Vec<JobRow> = sqlx::query_as(&sql)
            .bind(&pattern)
            .bind(status)
            .bind(job_type)
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM jobs {filter}"))
            .bind(&pattern)
            .bind(status)
            .bind(job_type)
            .fetch_one(&self.pool)
            .await?;

        Ok((decode_all(rows)?, total as u64))
    }

    async fn list_by_owner(&self, recruiter_id: Uuid) -> Result<Vec<Job>, AppError> {
        let rows: Vec<JobRow> =
            sqlx::query_as("SELECT * FROM jobs WHERE created_by = $1 ORDER BY created_at DESC")
                .bind(recruiter_id)
                .fetch_all(&self.pool)
                .await?;
        decode_all(rows)
    }

    async fn count_by_status(&self, status: Option<JobStatus>) -> Result<u64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE ($1::text IS NULL OR job_status = $1)")
                .bind(status.map(|s| s.as_str()))
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn created_since(&self, since: DateTime<Utc>) -> Result<Vec<DateTime<Utc>>, AppError> {
        Ok(
            sqlx::query_scalar("SELECT created_at FROM jobs WHERE created_at >= $1")
                .bind(since)
                .fetch_all(&self.pool)
                .await?,
        )
    }
}

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn insert(&self, application: &Application) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO applications
                (id, applicant_id, recruiter_id, job_id, status, date_of_application, resume,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(application.id)
        .bind(application.applicant_id)
        .bind(application.recruiter_id)
        .bind(application.job_id)
        .bind(application.status.as_str())
        .bind(application.date_of_application)
        .bind(&application.resume)
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // two concurrent submissions for the same (applicant, job)
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::validation("Already Applied")
            }
            other => AppError::Database(other),
        })?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let row: Option<ApplicationRow> =
            sqlx::query_as("SELECT * FROM applications WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(decode).transpose()
    }

    async fn find_by_applicant_and_job(
        &self,
        applicant_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            "SELECT * FROM applications WHERE applicant_id = $1 AND job_id = $2",
        )
        .bind(applicant_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(decode).transpose()
    }

    async fn list_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<Application>, AppError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(
            "SELECT * FROM applications WHERE applicant_id = $1 ORDER BY created_at DESC",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        decode_all(rows)
    }

    async fn list_by_recruiter(
        &self,
        recruiter_id: Uuid,
        limit: u32,
        offset: u64,
    ) -> Result<(Vec<Application>, u64), AppError> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(
            r#"
            SELECT * FROM applications
            WHERE recruiter_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(recruiter_id)
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE recruiter_id = $1")
                .bind(recruiter_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((decode_all(rows)?, total as u64))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE applications SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn reject_pending_for_job(&self, job_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE applications
            SET status = 'rejected', updated_at = now()
            WHERE job_id = $1 AND status = 'pending'
            "#,
        )
        .bind(job_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_for_job(&self, job_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM applications WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("acme"), "%acme%");
        assert_eq!(contains_pattern("_"), r"%\_%");
        assert_eq!(contains_pattern("100%"), r"%100\%%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
