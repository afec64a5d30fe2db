//! Thin HTTP client for the job board API. Keeps the session cookie between
//! calls.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::ClientError;
use crate::feedback::{self, Feedback};
use crate::resume::ResumeAttachment;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
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
}

#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Fields of one apply submission.
#[derive(Debug, Clone)]
pub struct ApplyForm {
    pub applicant_id: Uuid,
    pub recruiter_id: Uuid,
    pub job_id: Uuid,
    pub date_of_application: NaiveDate,
    pub resume: Option<ResumeAttachment>,
}

pub struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ClientError::NotSignedIn);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: feedback::from_body(false, &body).message().to_string(),
            });
        }
        Ok(response.json::<Envelope<T>>().await?.result)
    }

    /// Signs in; the session cookie is kept by the client.
    pub async fn login(&self, email: &str, password: &str) -> Result<Viewer, ClientError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        if response.status().as_u16() == 401 {
            return Err(ClientError::Api {
                status: 401,
                message: "Email or Password not matched".to_string(),
            });
        }
        Self::read(response).await
    }

    pub async fn me(&self) -> Result<Viewer, ClientError> {
        let response = self.client.get(self.url("/auth/me")).send().await?;
        Self::read(response).await
    }

    pub async fn get_job(&self, id: Uuid) -> Result<JobDetail, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/jobs/{id}")))
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn apply(&self, form: ApplyForm) -> Result<Feedback, ClientError> {
        let mut multipart = Form::new()
            .text("applicantId", form.applicant_id.to_string())
            .text("recruiterId", form.recruiter_id.to_string())
            .text("jobId", form.job_id.to_string())
            .text("status", "pending")
            .text(
                "dateOfApplication",
                form.date_of_application.format("%Y-%m-%d").to_string(),
            );
        if let Some(resume) = form.resume {
            let part = Part::bytes(resume.bytes)
                .file_name(resume.file_name)
                .mime_str(&resume.content_type)?;
            multipart = multipart.part("resume", part);
        }

        let response = self
            .client
            .post(self.url("/application/apply"))
            .multipart(multipart)
            .send()
            .await?;
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ClientError::NotSignedIn);
        }
        let body = response.text().await?;
        debug!("apply returned {status}: {body}");
        Ok(feedback::from_body(status.is_success(), &body))
    }
}
