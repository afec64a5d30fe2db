use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::SignedCookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{self, Session};
use crate::errors::{validation_messages, AppError};
use crate::models::user::{Role, User};
use crate::state::AppState;

const PASSWORD_SYMBOLS: &str = "@#$%^&*!";

pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    let mut chars = username.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if starts_with_letter && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(ValidationError::new("username").with_message(
            "Username must start with a letter and contain only letters, numbers and underscores"
                .into(),
        ))
    }
}

fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let strong = password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if strong {
        Ok(())
    } else {
        Err(ValidationError::new("password").with_message(
            "Password must contain an uppercase letter, a lowercase letter, a number and one of @#$%^&*!"
                .into(),
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 30, message = "Username must be between 3 and 30 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(
        length(min = 8, max = 20, message = "Password must be between 8 and 20 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    pub confirm_password: String,
    pub role: Option<String>,
    pub admin_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub status: bool,
    pub message: String,
    pub result: User,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub status: bool,
    pub message: String,
}

/// Role for a new account. The very first account is always an admin.
fn resolve_role(
    is_first: bool,
    requested: Option<&str>,
    admin_code: Option<&str>,
    configured_code: &str,
) -> Result<Role, AppError> {
    if is_first {
        return Ok(Role::Admin);
    }
    match requested.and_then(|r| r.parse::<Role>().ok()) {
        Some(Role::Admin) if admin_code == Some(configured_code) => Ok(Role::Admin),
        Some(Role::Admin) => Err(AppError::validation("Invalid admin code")),
        Some(Role::Recruiter) => Ok(Role::Recruiter),
        _ => Ok(Role::User),
    }
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let mut errors = match req.validate() {
        Ok(()) => Vec::new(),
        Err(e) => validation_messages(&e),
    };
    if req.password != req.confirm_password {
        errors.push("Password and confirm password do not match".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let email = req.email.trim().to_ascii_lowercase();
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::validation("Email already in use"));
    }

    let is_first = state.users.count().await? == 0;
    let role = resolve_role(
        is_first,
        req.role.as_deref(),
        req.admin_code.as_deref(),
        &state.settings.admin_code,
    )?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        username: req.username,
        email,
        password_hash: hash_password(&req.password).await?,
        role,
        location: None,
        gender: None,
        resume: None,
        created_at: now,
        updated_at: now,
    };
    state.users.insert(&user).await?;

    info!("Registered user {} as {}", user.id, user.role);
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            status: true,
            message: "Registration successful".to_string(),
            result: user,
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(SignedCookieJar, Json<UserResponse>), AppError> {
    let email = req.email.trim().to_ascii_lowercase();
    let user = match state.users.find_by_email(&email).await? {
        Some(user) if verify_password(&user.password_hash, &req.password).await? => user,
        _ => {
            warn!("failed login for {email}");
            return Err(AppError::InvalidCredentials);
        }
    };

    let jar = session::issue(jar, user.id, state.settings.cookie_secure);
    info!("User {} logged in", user.id);
    Ok((
        jar,
        Json(UserResponse {
            status: true,
            message: "Login successful".to_string(),
            result: user,
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(jar: SignedCookieJar) -> (SignedCookieJar, Json<MessageResponse>) {
    (
        session::clear(jar),
        Json(MessageResponse {
            status: true,
            message: "Logout successful".to_string(),
        }),
    )
}

/// GET /api/v1/auth/me
pub async fn handle_me(Extension(session): Extension<Session>) -> Json<UserResponse> {
    Json(UserResponse {
        status: true,
        message: "Current user".to_string(),
        result: session.user,
    })
}
