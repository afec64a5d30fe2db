use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Interview,
    Declined,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Interview => "interview",
            JobStatus::Declined => "declined",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "interview" => Ok(JobStatus::Interview),
            "declined" => Ok(JobStatus::Declined),
            _ => Err("Job status must be 'pending', 'interview', or 'declined'".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "full-time")]
    FullTime,
    #[serde(rename = "part-time")]
    PartTime,
    #[serde(rename = "internship")]
    Internship,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Internship => "internship",
        }
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full-time" => Ok(JobType::FullTime),
            "part-time" => Ok(JobType::PartTime),
            "internship" => Ok(JobType::Internship),
            _ => Err("Job type must be 'full-time', 'part-time', or 'internship'".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub job_status: JobStatus,
    pub job_type: JobType,
    pub job_location: String,
    pub created_by: Uuid,
    pub job_vacancy: i32,
    pub job_salary: i64,
    pub job_deadline: NaiveDate,
    pub job_description: String,
    pub job_skills: Vec<String>,
    pub job_facilities: Vec<String>,
    pub job_contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape of the `jobs` table; enums are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub job_status: String,
    pub job_type: String,
    pub job_location: String,
    pub created_by: Uuid,
    pub job_vacancy: i32,
    pub job_salary: i64,
    pub job_deadline: NaiveDate,
    pub job_description: String,
    pub job_skills: Vec<String>,
    pub job_facilities: Vec<String>,
    pub job_contact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = String;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Job {
            id: row.id,
            company: row.company,
            position: row.position,
            job_status: row.job_status.parse()?,
            job_type: row.job_type.parse()?,
            job_location: row.job_location,
            created_by: row.created_by,
            job_vacancy: row.job_vacancy,
            job_salary: row.job_salary,
            job_deadline: row.job_deadline,
            job_description: row.job_description,
            job_skills: row.job_skills,
            job_facilities: row.job_facilities,
            job_contact: row.job_contact,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Ordering accepted by the job listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    #[default]
    Newest,
    Oldest,
    CompanyAsc,
    CompanyDesc,
}

impl JobSort {
    pub fn order_by(&self) -> &'static str {
        match self {
            JobSort::Newest => "created_at DESC",
            JobSort::Oldest => "created_at ASC",
            JobSort::CompanyAsc => "company ASC",
            JobSort::CompanyDesc => "company DESC",
        }
    }
}

impl FromStr for JobSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(JobSort::Newest),
            "oldest" => Ok(JobSort::Oldest),
            "a-z" => Ok(JobSort::CompanyAsc),
            "z-a" => Ok(JobSort::CompanyDesc),
            _ => Err("Sort must be 'newest', 'oldest', 'a-z', or 'z-a'".to_string()),
        }
    }
}

/// Filters for the public job listing.
#[derive(Debug, Clone, Default)]
pub struct JobQuery {
    pub search: Option<String>,
    pub job_status: Option<JobStatus>,
    pub job_type: Option<JobType>,
    pub sort: JobSort,
    pub page: u32,
    pub limit: u32,
}

impl JobQuery {
    pub fn offset(&self) -> u64 {
        crate::pagination::offset(self.page, self.limit)
    }

    pub fn matches(&self, job: &Job) -> bool {
        let search_ok = match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                job.company.to_lowercase().contains(&term)
                    || job.position.to_lowercase().contains(&term)
            }
            None => true,
        };
        search_ok
            && self.job_status.map_or(true, |s| s == job.job_status)
            && self.job_type.map_or(true, |t| t == job.job_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_wire_names() {
        assert_eq!(
            serde_json::to_value(JobType::PartTime).unwrap(),
            serde_json::json!("part-time")
        );
        assert_eq!("internship".parse::<JobType>(), Ok(JobType::Internship));
        assert!("contract".parse::<JobType>().is_err());
    }

    #[test]
    fn test_job_status_parse_any_case() {
        assert_eq!("DECLINED".parse::<JobStatus>(), Ok(JobStatus::Declined));
    }

    #[test]
    fn test_query_offset() {
        let query = JobQuery {
            page: 3,
            limit: 5,
            ..Default::default()
        };
        assert_eq!(query.offset(), 10);
        let first = JobQuery {
            page: 0,
            limit: 5,
            ..Default::default()
        };
        assert_eq!(first.offset(), 0);
    }
}
