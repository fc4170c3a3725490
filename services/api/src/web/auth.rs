//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for signup, login, and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use gradebook_core::{verify_login, AuthError, RegistrationError, Registration};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::{internal_error, HandlerError};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub account_id: Uuid,
    pub username: String,
}

//=========================================================================================
// Session Cookie Helpers
//=========================================================================================

const SESSION_COOKIE: &str = "session";

fn session_cookie(session_id: &str, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        ttl.num_seconds()
    )
}

pub(crate) fn cleared_session_cookie() -> String {
    format!("{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Extracts the session id from the `Cookie` header, if present.
pub(crate) fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix("session=")
        })
        .filter(|id| !id.is_empty())
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created successfully", body = AuthResponse),
        (status = 400, description = "Invalid input or mismatching password confirmation"),
        (status = 409, description = "Username already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    // 1. The confirmation only exists at this boundary
    if req.password != req.confirm_password {
        return Err((StatusCode::BAD_REQUEST, "Passwords do not match".to_string()));
    }

    // 2. Validate and stretch the password off the async workers
    let SignupRequest {
        username,
        display_name,
        password,
        ..
    } = req;
    let registration = tokio::task::spawn_blocking(move || {
        Registration::prepare(&username, &display_name, &password)
    })
    .await
    .map_err(internal_error("Failed to hash password"))?
    .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let username = registration.username().to_string();

    // 3. Create the account
    let account_id = state
        .credentials
        .complete_registration(registration)
        .await
        .map_err(|e| match e {
            RegistrationError::DuplicateUsername => (
                StatusCode::CONFLICT,
                "Username already exists. Please choose a different one.".to_string(),
            ),
            RegistrationError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
            RegistrationError::Storage(e) => {
                error!("Failed to create account: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to create account".to_string(),
                )
            }
        })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            account_id: account_id.0,
            username,
        }),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    // 1. Look up the stored credential
    let found = state
        .credentials
        .lookup(&req.username)
        .await
        .map_err(internal_error("Failed to look up account"))?;

    // 2. Verify password on the blocking pool
    let password = req.password;
    let account_id = tokio::task::spawn_blocking(move || verify_login(found, &password))
        .await
        .map_err(internal_error("Failed to verify password"))?
        .map_err(|e| match e {
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid username or password".to_string(),
            ),
            AuthError::Storage(e) => {
                error!("Failed to verify account: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication error".to_string(),
                )
            }
        })?;

    // 3. Create auth session
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = state.config.session_ttl;
    state
        .sessions
        .create_auth_session(&auth_session_id, account_id, Utc::now() + ttl)
        .await
        .map_err(internal_error("Failed to create session"))?;
    info!(account_id = %account_id, "Login successful");

    // 4. Return response with cookie
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&auth_session_id, ttl))],
        Json(AuthResponse {
            account_id: account_id.0,
            username: req.username,
        }),
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let auth_session_id = session_id_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state
        .sessions
        .delete_auth_session(auth_session_id)
        .await
        .map_err(internal_error("Failed to logout"))?;

    Ok((StatusCode::OK, [(header::SET_COOKIE, cleared_session_cookie())]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn session_id_is_found_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session=abc-123; lang=en");
        assert_eq!(session_id_from_headers(&headers), Some("abc-123"));
    }

    #[test]
    fn missing_or_empty_session_cookie_is_none() {
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
        assert_eq!(session_id_from_headers(&headers_with_cookie("theme=dark")), None);
        assert_eq!(session_id_from_headers(&headers_with_cookie("session=")), None);
    }

    #[test]
    fn cookie_carries_ttl_in_seconds() {
        let cookie = session_cookie("xyz", Duration::days(1));
        assert!(cookie.starts_with("session=xyz;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.ends_with("Max-Age=86400"));
        assert!(cleared_session_cookie().ends_with("Max-Age=0"));
    }
}
