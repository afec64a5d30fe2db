use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::service::{self, ApplyRequest};
use crate::auth::gate;
use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::application::{Application, ApplicationStatus, ApplicationWithJob};
use crate::pagination::{Page, PageParams};
use crate::state::AppState;
use crate::storage::resume::{self, ResumeForm, UploadConfig};

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub status: bool,
    pub message: String,
    pub result: Application,
}

#[derive(Serialize)]
pub struct ApplicantJobsResponse {
    pub status: bool,
    pub result: Vec<ApplicationWithJob>,
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Pulls the apply fields out of the form, collecting every problem.
fn parse_apply_form(form: &ResumeForm) -> Result<ApplyRequest, AppError> {
    let mut errors = Vec::new();

    let mut required_id = |field: &str, label: &str| -> Option<Uuid> {
        match form.text(field) {
            None => {
                errors.push(format!("{label} is required"));
                None
            }
            Some(raw) => match raw.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(format!("Invalid {label} format"));
                    None
                }
            },
        }
    };
    let applicant_id = required_id("applicantId", "Applicant ID");
    let job_id = required_id("jobId", "Job ID");

    let recruiter_id = match form.text("recruiterId").map(str::parse::<Uuid>) {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(_)) => {
            errors.push("Invalid Recruiter ID format".to_string());
            None
        }
    };

    let status = match form.text("status").map(str::parse::<ApplicationStatus>) {
        None => None,
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => {
            errors.push(e);
            None
        }
    };

    let date_of_application = match form
        .text("dateOfApplication")
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
    {
        None => None,
        Some(Ok(date)) => Some(date),
        Some(Err(_)) => {
            errors.push("Invalid date format, expected YYYY-MM-DD".to_string());
            None
        }
    };

    match (applicant_id, job_id) {
        (Some(applicant_id), Some(job_id)) if errors.is_empty() => Ok(ApplyRequest {
            applicant_id,
            recruiter_id,
            job_id,
            status,
            date_of_application,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

/// POST /api/v1/application/apply
pub async fn handle_apply(
    State(state): State<AppState>,
    State(upload): State<UploadConfig>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApplicationResponse>), AppError> {
    session.authorize(gate::APPLICANTS)?;

    let mut form = resume::read_form(multipart).await?;
    let request = parse_apply_form(&form)?;
    let upload = resume::classify(form.resume.take(), &upload)?;

    let application = service::apply(&state, &session, request, upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            status: true,
            message: "Application submitted successfully".to_string(),
            result: application,
        }),
    ))
}

/// GET /api/v1/application/applicant-jobs
pub async fn handle_applicant_jobs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<ApplicantJobsResponse>, AppError> {
    session.authorize(gate::APPLICANTS)?;
    let result = service::list_for_applicant(&state, session.user_id).await?;
    Ok(Json(ApplicantJobsResponse {
        status: true,
        result,
    }))
}

/// GET /api/v1/application/recruiter-jobs
pub async fn handle_recruiter_jobs(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Application>>, AppError> {
    session.authorize(gate::RECRUITERS)?;
    let (page, limit) = params.resolve();
    let page = service::list_for_recruiter(&state, session.user_id, page, limit).await?;
    Ok(Json(page))
}

/// PATCH /api/v1/application/:id
pub async fn handle_update_status(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<ApplicationResponse>, AppError> {
    session.authorize(gate::RECRUITERS)?;
    let status: ApplicationStatus = req.status.parse().map_err(AppError::validation)?;
    let application = service::update_status(&state, &session, id, status).await?;
    Ok(Json(ApplicationResponse {
        status: true,
        message: "Application status updated".to_string(),
        result: application,
    }))
}

/// GET /api/v1/application/:applicationId/resume
pub async fn handle_fetch_resume(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(application_id): Path<Uuid>,
) -> Result<Response, AppError> {
    session.authorize(gate::APPLICATION_PARTIES)?;
    let download = service::fetch_resume(&state, &session, application_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", download.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::models::application::ApplicationStatus;
    use crate::models::user::{Role, User};
    use crate::state::test_support::{
        body_json, multipart_body, multipart_content_type, FilePart, TestApp,
    };
    use crate::store::ApplicationRepository;

    fn apply_request(
        app: &TestApp,
        caller: &User,
        fields: &[(&str, &str)],
        file: Option<FilePart<'_>>,
    ) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/application/apply")
            .header(header::COOKIE, app.cookie(caller))
            .header(header::CONTENT_TYPE, multipart_content_type())
            .body(Body::from(multipart_body(fields, file)))
            .unwrap()
    }

    fn status_request(app: &TestApp, caller: &User, id: &str, status: &str) -> Request<Body> {
        Request::builder()
            .method(Method::PATCH)
            .uri(format!("/api/v1/application/{id}"))
            .header(header::COOKIE, app.cookie(caller))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "status": status }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_apply_requires_user_role() {
        let app = TestApp::new().await;
        let recruiter = app.user(Role::Recruiter, "rita").await;
        let admin = app.user(Role::Admin, "ada").await;
        let job = app.job(&recruiter, "Acme Labs").await;
        let job_id = job.id.to_string();

        for caller in [&recruiter, &admin] {
            let caller_id = caller.id.to_string();
            let response = app
                .router()
                .oneshot(apply_request(
                    &app,
                    caller,
                    &[("applicantId", &caller_id), ("jobId", &job_id)],
                    None,
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }
        assert_eq!(app.store.application_count().await, 0);
    }

    #[tokio::test]
    async fn test_apply_without_session_is_unauthenticated() {
        let app = TestApp::new().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/application/apply")
            .header(header::CONTENT_TYPE, multipart_content_type())
            .body(Body::from(multipart_body(&[], None)))
            .unwrap();

        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_apply_without_resume_creates_pending() {
        let app = TestApp::new().await;
        let recruiter = app.user(Role::Recruiter, "rita").await;
        let applicant = app.user(Role::User, "umar").await;
        let job = app.job(&recruiter, "Acme Labs").await;
        let (applicant_id, recruiter_id, job_id) = (
            applicant.id.to_string(),
            recruiter.id.to_string(),
            job.id.to_string(),
        );

        let response = app
            .router()
            .oneshot(apply_request(
                &app,
                &applicant,
                &[
                    ("applicantId", &applicant_id),
                    ("recruiterId", &recruiter_id),
                    ("jobId", &job_id),
                    ("status", "pending"),
                    ("dateOfApplication", "2024-05-01"),
                ],
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], true);
        assert_eq!(body["result"]["status"], "pending");
        assert!(body["result"]["resume"].is_null());
        assert_eq!(body["result"]["recruiterId"], recruiter_id);
        assert_eq!(app.stored_file_count(), 0);
    }

    #[tokio::test]
    async fn test_apply_with_disallowed_type_stores_nothing() {
        let app = TestApp::new().await;
        let recruiter = app.user(Role::Recruiter, "rita").await;
        let applicant = app.user(Role::User, "umar").await;
        let job = app.job(&recruiter, "Acme Labs").await;
        let (applicant_id, job_id) = (applicant.id.to_string(), job.id.to_string());

        let response = app
            .router()
            .oneshot(apply_request(
                &app,
                &applicant,
                &[("applicantId", &applicant_id), ("jobId", &job_id)],
                Some(FilePart {
                    field: "resume",
                    file_name: "photo.png",
                    content_type: "image/png",
                    bytes: b"\x89PNG\r\n",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"][0]["msg"], "Only PDF and DOC files are allowed");
        assert_eq!(app.store.application_count().await, 0);
        assert_eq!(app.stored_file_count(), 0);
    }

    #[tokio::test]
    async fn test_apply_with_pdf_is_downloadable() {
        let app = TestApp::new().await;
        let recruiter = app.user(Role::Recruiter, "rita").await;
        let applicant = app.user(Role::User, "umar").await;
        let job = app.job(&recruiter, "Acme Labs").await;
        let (applicant_id, job_id) = (applicant.id.to_string(), job.id.to_string());

        let response = app
            .router()
            .oneshot(apply_request(
                &app,
                &applicant,
                &[("applicantId", &applicant_id), ("jobId", &job_id)],
                Some(FilePart {
                    field: "resume",
                    file_name: "cv.pdf",
                    content_type: "application/pdf",
                    bytes: b"%PDF-1.7 test",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["result"]["id"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(app.stored_file_count(), 1);

        let request = Request::builder()
            .uri(format!("/api/v1/application/{id}/resume"))
            .header(header::COOKIE, app.cookie(&recruiter))
            .body(Body::empty())
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cv.pdf\""
        );
    }

    #[tokio::test]
    async fn test_apply_collects_field_errors() {
        let app = TestApp::new().await;
        let applicant = app.user(Role::User, "umar").await;

        let response = app
            .router()
            .oneshot(apply_request(
                &app,
                &applicant,
                &[("jobId", "not-a-uuid"), ("dateOfApplication", "01/05/2024")],
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let messages: Vec<&str> = body["error"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["msg"].as_str().unwrap())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Applicant ID is required",
                "Invalid Job ID format",
                "Invalid date format, expected YYYY-MM-DD"
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_application_rejected() {
        let app = TestApp::new().await;
        let recruiter = app.user(Role::Recruiter, "rita").await;
        let applicant = app.user(Role::User, "umar").await;
        let job = app.job(&recruiter, "Acme Labs").await;
        let (applicant_id, job_id) = (applicant.id.to_string(), job.id.to_string());
        let fields = [("applicantId", applicant_id.as_str()), ("jobId", job_id.as_str())];

        let first = app
            .router()
            .oneshot(apply_request(&app, &applicant, &fields, None))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .router()
            .oneshot(apply_request(&app, &applicant, &fields, None))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(second).await["error"][0]["msg"], "Already Applied");
        assert_eq!(app.store.application_count().await, 1);
    }

    #[tokio::test]
    async fn test_review_scenario() {
        let app = TestApp::new().await;
        let owner = app.user(Role::Recruiter, "rita").await;
        let other = app.user(Role::Recruiter, "ralf").await;
        let applicant = app.user(Role::User, "umar").await;
        let job = app.job(&owner, "Acme Labs").await;
        let (applicant_id, job_id) = (applicant.id.to_string(), job.id.to_string());

        let response = app
            .router()
            .oneshot(apply_request(
                &app,
                &applicant,
                &[("applicantId", &applicant_id), ("jobId", &job_id)],
                None,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["result"]["status"], "pending");
        let id = body["result"]["id"].as_str().unwrap().to_string();

        let response = app
            .router()
            .oneshot(status_request(&app, &owner, &id, "accepted"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["result"]["status"], "accepted");

        let response = app
            .router()
            .oneshot(status_request(&app, &other, &id, "rejected"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let stored = ApplicationRepository::find(&*app.store, id.parse().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, ApplicationStatus::Accepted);
    }

    #[tokio::test]
    async fn test_update_with_unknown_status_is_validation_error() {
        let app = TestApp::new().await;
        let owner = app.user(Role::Recruiter, "rita").await;
        let response = app
            .router()
            .oneshot(status_request(
                &app,
                &owner,
                &uuid::Uuid::new_v4().to_string(),
                "hired",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_listing_endpoints_respect_roles() {
        let app = TestApp::new().await;
        let recruiter = app.user(Role::Recruiter, "rita").await;
        let applicant = app.user(Role::User, "umar").await;

        let get = |uri: &str, caller: &User| {
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, app.cookie(caller))
                .body(Body::empty())
                .unwrap()
        };

        let response = app
            .router()
            .oneshot(get("/api/v1/application/applicant-jobs", &recruiter))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .router()
            .oneshot(get("/api/v1/application/recruiter-jobs", &applicant))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .router()
            .oneshot(get("/api/v1/application/recruiter-jobs?page=1&limit=5", &recruiter))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["currentPage"], 1);
    }
}
