use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::auth::gate;
use crate::auth::handlers::validate_username;
use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;
use crate::storage::resume::{self, ResumeForm, ResumeUpload, UploadConfig};

#[derive(Serialize)]
pub struct UserResponse {
    pub status: bool,
    pub result: User,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub status: bool,
    pub result: Vec<User>,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub status: bool,
    pub message: String,
    pub deleted: u64,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Default, PartialEq)]
struct ProfilePatch {
    username: Option<String>,
    location: Option<String>,
    gender: Option<String>,
}

fn parse_profile_form(form: &ResumeForm) -> Result<ProfilePatch, AppError> {
    let username = form.text("username").map(String::from);
    if let Some(name) = &username {
        let mut errors = Vec::new();
        if !(3..=30).contains(&name.chars().count()) {
            errors.push("Username must be between 3 and 30 characters".to_string());
        }
        if let Err(e) = validate_username(name) {
            errors.push(e.message.map(|m| m.to_string()).unwrap_or_default());
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
    }
    Ok(ProfilePatch {
        username,
        location: form.text("location").map(String::from),
        gender: form.text("gender").map(String::from),
    })
}

/// GET /api/v1/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<UsersResponse>, AppError> {
    session.authorize(gate::ADMINS)?;
    let result = state.users.list().await?;
    Ok(Json(UsersResponse {
        status: true,
        result,
    }))
}

/// PATCH /api/v1/users
pub async fn handle_update_profile(
    State(state): State<AppState>,
    State(upload): State<UploadConfig>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let mut form = resume::read_form(multipart).await?;
    let patch = parse_profile_form(&form)?;
    let upload = resume::classify(form.resume.take(), &upload)?;

    let mut user = session.user;
    let previous_resume = user.resume.clone();
    if let Some(username) = patch.username {
        user.username = username;
    }
    if let Some(location) = patch.location {
        user.location = Some(location);
    }
    if let Some(gender) = patch.gender {
        user.gender = Some(gender);
    }
    let replaced = match upload {
        ResumeUpload::Attached(file) => {
            user.resume = Some(resume::store(&state.files, file).await?);
            true
        }
        ResumeUpload::Absent => false,
    };
    user.updated_at = Utc::now();

    if let Err(e) = state.users.update(&user).await {
        if let (true, Some(name)) = (replaced, &user.resume) {
            if let Err(cleanup) = state.files.delete(name).await {
                error!("Failed to remove orphaned resume {name}: {cleanup}");
            }
        }
        return Err(e);
    }
    if let (true, Some(old)) = (replaced, previous_resume) {
        if let Err(e) = state.files.delete(&old).await {
            warn!("Failed to remove replaced resume {old}: {e}");
        }
    }

    info!("User {} updated their profile", user.id);
    Ok(Json(UserResponse {
        status: true,
        result: user,
    }))
}

/// DELETE /api/v1/users
pub async fn handle_delete_all_users(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<DeletedResponse>, AppError> {
    session.authorize(gate::ADMINS)?;
    let deleted = state.users.delete_non_admins().await?;
    info!("Admin {} deleted {deleted} non-admin users", session.user_id);
    Ok(Json(DeletedResponse {
        status: true,
        message: "All non-admin users deleted".to_string(),
        deleted,
    }))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .users
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse {
        status: true,
        result: user,
    }))
}

/// DELETE /api/v1/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, AppError> {
    session.authorize(gate::ADMINS)?;
    let user = state
        .users
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    if user.role == Role::Admin {
        return Err(AppError::forbidden("Admin accounts cannot be deleted"));
    }
    state.users.delete(user.id).await?;
    info!("Admin {} deleted user {}", session.user_id, user.id);
    Ok(Json(DeletedResponse {
        status: true,
        message: "User deleted".to_string(),
        deleted: 1,
    }))
}
