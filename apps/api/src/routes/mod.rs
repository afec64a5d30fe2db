pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::admin::handlers as admin;
use crate::applications::handlers as applications;
use crate::auth::{handlers as auth, session::require_session};
use crate::jobs::handlers as jobs;
use crate::state::AppState;
use crate::users::handlers as users;

/// Room for the multipart framing and text fields around a resume.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.upload.max_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        // Session required from here up
        .route("/api/v1/auth/me", get(auth::handle_me))
        .route("/api/v1/jobs", post(jobs::handle_create_job))
        .route("/api/v1/jobs/my-jobs", get(jobs::handle_my_jobs))
        .route(
            "/api/v1/jobs/:id",
            patch(jobs::handle_update_job).delete(jobs::handle_delete_job),
        )
        .route(
            "/api/v1/jobs/:id/status",
            patch(jobs::handle_update_job_status),
        )
        .route(
            "/api/v1/application/apply",
            post(applications::handle_apply),
        )
        .route(
            "/api/v1/application/applicant-jobs",
            get(applications::handle_applicant_jobs),
        )
        .route(
            "/api/v1/application/recruiter-jobs",
            get(applications::handle_recruiter_jobs),
        )
        .route(
            "/api/v1/application/:id",
            patch(applications::handle_update_status),
        )
        .route(
            "/api/v1/application/:id/resume",
            get(applications::handle_fetch_resume),
        )
        .route(
            "/api/v1/users",
            get(users::handle_list_users)
                .patch(users::handle_update_profile)
                .delete(users::handle_delete_all_users),
        )
        .route(
            "/api/v1/users/:id",
            get(users::handle_get_user).delete(users::handle_delete_user),
        )
        .route("/api/v1/admin/info", get(admin::handle_info))
        .route(
            "/api/v1/admin/monthly-stats",
            get(admin::handle_monthly_stats),
        )
        .layer(from_fn_with_state(state.clone(), require_session))
        // Public
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/logout", post(auth::handle_logout))
        .route("/api/v1/jobs", get(jobs::handle_list_jobs))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
