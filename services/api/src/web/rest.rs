//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the account and course endpoints and the
//! master definition for the OpenAPI specification.

use crate::web::auth::{self, cleared_session_cookie};
use crate::web::state::AppState;
use crate::web::{internal_error, HandlerError};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use gradebook_core::{AccountId, CourseError, CourseRecord, CourseRecordId, GradeSummary, Gradebook};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        grading_scale_handler,
        profile_handler,
        delete_account_handler,
        list_courses_handler,
        create_course_handler,
        update_course_handler,
        delete_course_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            GradingScaleResponse,
            ProfileResponse,
            SummaryResponse,
            CourseResponse,
            CourseRequest,
            CreateCourseResponse,
            DeleteAccountRequest,
        )
    ),
    tags(
        (name = "CGPA Calculator API", description = "Accounts, course records and grade-point averages.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The credit and grade values a course may take.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct GradingScaleResponse {
    pub credits: Vec<f64>,
    pub grades: Vec<f64>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub code: String,
    pub credit: f64,
    pub grade: f64,
    pub created_at: DateTime<Utc>,
}

impl From<CourseRecord> for CourseResponse {
    fn from(record: CourseRecord) -> Self {
        Self {
            id: record.id.0,
            code: record.code,
            credit: record.credit.value(),
            grade: record.grade.value(),
            created_at: record.created_at,
        }
    }
}

/// Aggregate figures, rounded to two decimals for display.
#[derive(Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub total_points: f64,
    pub total_credits: f64,
    pub cgpa: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<GradeSummary> for SummaryResponse {
    fn from(summary: GradeSummary) -> Self {
        Self {
            total_points: round2(summary.total_points),
            total_credits: summary.total_credits,
            cgpa: round2(summary.average_point),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub account_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub courses: Vec<CourseResponse>,
    pub summary: SummaryResponse,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CourseRequest {
    pub code: String,
    pub credit: f64,
    pub grade: f64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateCourseResponse {
    pub id: Uuid,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    /// Must be `true`; the deletion is permanent.
    pub confirm: bool,
}

fn course_error(e: CourseError) -> HandlerError {
    match e {
        CourseError::Validation(v) => (StatusCode::BAD_REQUEST, v.to_string()),
        CourseError::AccountNotFound(_) => (StatusCode::NOT_FOUND, "Account not found".to_string()),
        CourseError::Storage(e) => {
            error!("Course operation failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Course operation failed".to_string(),
            )
        }
    }
}

fn course_not_found() -> HandlerError {
    (StatusCode::NOT_FOUND, "Course not found".to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the allowed credit weights and grade points.
#[utoipa::path(
    get,
    path = "/grading-scale",
    responses(
        (status = 200, description = "Allowed values", body = GradingScaleResponse)
    )
)]
pub async fn grading_scale_handler() -> Json<GradingScaleResponse> {
    let scale = Gradebook::grading_scale();
    Json(GradingScaleResponse {
        credits: scale.credits,
        grades: scale.grades,
    })
}

/// The logged-in account with its courses and CGPA summary.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Account profile", body = ProfileResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<AccountId>,
) -> Result<Json<ProfileResponse>, HandlerError> {
    let profile = state
        .gradebook
        .profile(owner)
        .await
        .map_err(internal_error("Failed to fetch profile"))?
        .ok_or((StatusCode::NOT_FOUND, "Account not found".to_string()))?;

    let summary = gradebook_core::aggregate(&profile.courses);
    let account = profile.account;
    Ok(Json(ProfileResponse {
        account_id: account.id.0,
        username: account.username,
        display_name: account.display_name,
        created_at: account.created_at,
        courses: profile.courses.into_iter().map(CourseResponse::from).collect(),
        summary: summary.into(),
    }))
}

/// Permanently delete the logged-in account and all of its courses.
#[utoipa::path(
    delete,
    path = "/me",
    request_body = DeleteAccountRequest,
    responses(
        (status = 204, description = "Account deleted"),
        (status = 400, description = "Deletion was not confirmed"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Account already deleted")
    )
)]
pub async fn delete_account_handler(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<AccountId>,
    Json(req): Json<DeleteAccountRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if !req.confirm {
        return Err((
            StatusCode::BAD_REQUEST,
            "Confirm that all data will be permanently deleted".to_string(),
        ));
    }

    let deleted = state
        .gradebook
        .delete_account(owner)
        .await
        .map_err(internal_error("Failed to delete account"))?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Account not found".to_string()));
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_session_cookie())],
    ))
}

/// List the logged-in account's courses, oldest first.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Courses in creation order", body = [CourseResponse]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<AccountId>,
) -> Result<Json<Vec<CourseResponse>>, HandlerError> {
    let courses = state
        .gradebook
        .list_courses(owner)
        .await
        .map_err(internal_error("Failed to list courses"))?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Add a course.
#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course added", body = CreateCourseResponse),
        (status = 400, description = "Empty code or value outside the grading scale"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn create_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<AccountId>,
    Json(req): Json<CourseRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = state
        .gradebook
        .add_course(owner, &req.code, req.credit, req.grade)
        .await
        .map_err(course_error)?;
    Ok((StatusCode::CREATED, Json(CreateCourseResponse { id: id.0 })))
}

/// Replace a course's code, credit and grade.
#[utoipa::path(
    put,
    path = "/courses/{id}",
    request_body = CourseRequest,
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course updated"),
        (status = 400, description = "Empty code or value outside the grading scale"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "No such course for this account")
    )
)]
pub async fn update_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<AccountId>,
    Path(id): Path<Uuid>,
    Json(req): Json<CourseRequest>,
) -> Result<StatusCode, HandlerError> {
    let updated = state
        .gradebook
        .update_course(owner, CourseRecordId(id), &req.code, req.credit, req.grade)
        .await
        .map_err(course_error)?;
    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(course_not_found())
    }
}

/// Delete a course.
#[utoipa::path(
    delete,
    path = "/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "No such course for this account")
    )
)]
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(owner): Extension<AccountId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    let deleted = state
        .gradebook
        .delete_course(owner, CourseRecordId(id))
        .await
        .map_err(internal_error("Failed to delete course"))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(course_not_found())
    }
}
