use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use chrono::{Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::auth::gate::{self, RoleSet};
use crate::errors::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "jobPortalToken";

/// Sessions older than this are refused even with a valid signature.
pub const SESSION_TTL_HOURS: i64 = 24;

/// The authenticated principal of a request.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
    pub user: User,
}

impl Session {
    pub fn authorize(&self, allowed: RoleSet) -> Result<(), AppError> {
        gate::authorize(self.role, allowed)
    }
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        Session {
            user_id: user.id,
            role: user.role,
            user,
        }
    }
}

/// Adds a signed session cookie for `user_id` to the jar.
pub fn issue(jar: SignedCookieJar, user_id: Uuid, secure: bool) -> SignedCookieJar {
    let value = format!("{}:{}", user_id, Utc::now().timestamp());
    jar.add(
        Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax),
    )
}

/// Expires the session cookie whether or not the request carried one.
pub fn clear(jar: SignedCookieJar) -> SignedCookieJar {
    jar.add(Cookie::build(SESSION_COOKIE).path("/").removal())
}

/// Parses `<uuid>:<issued unix seconds>`; `None` if malformed or expired.
fn parse_session_value(value: &str) -> Option<Uuid> {
    let (id, issued) = value.split_once(':')?;
    let issued = chrono::DateTime::from_timestamp(issued.parse().ok()?, 0)?;
    if Utc::now() - issued > Duration::hours(SESSION_TTL_HOURS) {
        return None;
    }
    id.parse().ok()
}

/// Resolves the session cookie into a `Session` request extension, or
/// answers 401 before any handler runs.
pub async fn require_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| parse_session_value(c.value()))
    else {
        warn!("session missing or invalid for {}", request.uri().path());
        return Err(AppError::Unauthenticated);
    };

    let Some(user) = state.users.find(user_id).await? else {
        warn!("session refers to unknown user {user_id}");
        return Err(AppError::Unauthenticated);
    };

    request.extensions_mut().insert(Session::from(user));
    Ok(next.run(request).await)
}
