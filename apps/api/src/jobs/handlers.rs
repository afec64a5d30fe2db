use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::gate;
use crate::auth::session::Session;
use crate::errors::AppError;
use crate::jobs::service::{self, CreateJobRequest, UpdateJobRequest};
use crate::models::job::{Job, JobQuery, JobSort, JobStatus, JobType};
use crate::pagination::PageParams;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub job_status: Option<String>,
    pub job_type: Option<String>,
}

impl JobListParams {
    /// Turns raw query strings into a `JobQuery`. Empty values and `all` mean
    /// no filter.
    fn into_query(self) -> Result<JobQuery, AppError> {
        fn filter(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty() && v != "all")
        }

        let mut errors = Vec::new();
        let job_status = filter(self.job_status).and_then(|s| {
            s.parse::<JobStatus>()
                .map_err(|e| errors.push(e))
                .ok()
        });
        let job_type = filter(self.job_type).and_then(|t| {
            t.parse::<JobType>()
                .map_err(|e| errors.push(e))
                .ok()
        });
        let sort = filter(self.sort)
            .and_then(|s| s.parse::<JobSort>().map_err(|e| errors.push(e)).ok())
            .unwrap_or_default();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let (page, limit) = PageParams {
            page: self.page,
            limit: self.limit,
        }
        .resolve();
        Ok(JobQuery {
            search: filter(self.search),
            job_status,
            job_type,
            sort,
            page,
            limit,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub status: bool,
    pub result: Vec<Job>,
    pub total_jobs: u64,
    pub current_page: u32,
    pub page_count: u32,
}

#[derive(Serialize)]
pub struct JobResponse {
    pub status: bool,
    pub result: Job,
}

#[derive(Serialize)]
pub struct JobsResponse {
    pub status: bool,
    pub result: Vec<Job>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub status: bool,
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusUpdate {
    pub job_status: String,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> Result<Json<JobListResponse>, AppError> {
    let query = params.into_query()?;
    let (result, total) = service::list(&state, &query).await?;
    Ok(Json(JobListResponse {
        status: true,
        result,
        total_jobs: total,
        current_page: query.page,
        page_count: total.div_ceil(u64::from(query.limit)) as u32,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, AppError> {
    let job = service::get(&state, id).await?;
    Ok(Json(JobResponse {
        status: true,
        result: job,
    }))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), AppError> {
    session.authorize(gate::RECRUITERS)?;
    let job = service::create(&state, &session, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            status: true,
            result: job,
        }),
    ))
}

/// GET /api/v1/jobs/my-jobs
pub async fn handle_my_jobs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<JobsResponse>, AppError> {
    session.authorize(gate::RECRUITERS)?;
    let result = service::list_for_owner(&state, &session).await?;
    Ok(Json(JobsResponse {
        status: true,
        result,
    }))
}

/// PATCH /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<Json<JobResponse>, AppError> {
    session.authorize(gate::RECRUITERS)?;
    let job = service::update(&state, &session, id, req).await?;
    Ok(Json(JobResponse {
        status: true,
        result: job,
    }))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, AppError> {
    session.authorize(gate::RECRUITERS)?;
    service::delete(&state, &session, id).await?;
    Ok(Json(DeletedResponse {
        status: true,
        message: "Job deleted".to_string(),
    }))
}

/// PATCH /api/v1/jobs/:id/status
pub async fn handle_update_job_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobStatusUpdate>,
) -> Result<Json<JobResponse>, AppError> {
    session.authorize(gate::RECRUITERS)?;
    let status: JobStatus = req.job_status.parse().map_err(AppError::validation)?;
    let job = service::update_status(&state, &session, id, status).await?;
    Ok(Json(JobResponse {
        status: true,
        result: job,
    }))
}
