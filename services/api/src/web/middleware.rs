//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use gradebook_core::ports::PortError;
use tracing::{debug, error};

use crate::web::auth::session_id_from_headers;
use crate::web::state::AppState;

/// Middleware that validates the auth session cookie and extracts the account id.
///
/// If valid, inserts the `AccountId` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Parse session ID from cookie
    let auth_session_id = session_id_from_headers(req.headers())
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    // 2. Validate auth session in database, get account id
    let account_id = state
        .sessions
        .validate_auth_session(&auth_session_id)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized => {
                debug!("Rejected unknown or expired auth session");
                StatusCode::UNAUTHORIZED
            }
            other => {
                error!("Failed to validate auth session: {:?}", other);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    // 3. Insert account id into request extensions
    req.extensions_mut().insert(account_id);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
