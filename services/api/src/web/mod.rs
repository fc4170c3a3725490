pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::error;

pub use middleware::require_auth;
pub use state::AppState;

/// Error shape returned by every handler: a status plus a human-readable message.
pub(crate) type HandlerError = (StatusCode, String);

/// Logs the underlying error and hides it behind a 500 with a fixed message.
pub(crate) fn internal_error<E: Debug>(context: &'static str) -> impl FnOnce(E) -> HandlerError {
    move |e| {
        error!("{}: {:?}", context, e);
        (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
    }
}

/// Builds the API router. Course and account routes sit behind the session check.
pub fn router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/grading-scale", get(rest::grading_scale_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/me",
            get(rest::profile_handler).delete(rest::delete_account_handler),
        )
        .route(
            "/courses",
            get(rest::list_courses_handler).post(rest::create_course_handler),
        )
        .route(
            "/courses/{id}",
            put(rest::update_course_handler).delete(rest::delete_course_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
