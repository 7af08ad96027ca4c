use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Identity;
use crate::database::models::Enrollment;
use crate::handlers::{ApiJson, JsonOrForm};
use crate::middleware::{ApiResponse, ApiResult, OwnedCourse};
use crate::services::ProgressUpdate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    #[serde(default)]
    pub course_id: Option<String>,
}

/// POST /api/enrollments - enroll the caller in a course
pub async fn enrollment_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    JsonOrForm(body): JsonOrForm<EnrollRequest>,
) -> ApiResult<Enrollment> {
    let course_id = body.course_id.unwrap_or_default();
    let enrollment = state.enrollments().enroll(&identity, &course_id).await?;
    Ok(ApiResponse::created(enrollment))
}

/// GET /api/enrollments/me - the caller's enrollments, newest first
pub async fn enrollments_me_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<Enrollment>> {
    let enrollments = state.enrollments().list_for_student(&identity.uid).await?;
    Ok(ApiResponse::success(enrollments))
}

/// GET /api/enrollments/course/:id - roster of an owned course
pub async fn course_roster_get(
    State(state): State<AppState>,
    Extension(OwnedCourse(course)): Extension<OwnedCourse>,
) -> ApiResult<Vec<Enrollment>> {
    let roster = state.enrollments().list_for_course(&course.id).await?;
    Ok(ApiResponse::success(roster))
}

/// DELETE /api/enrollments/:enrollment_id - unenroll the caller
pub async fn enrollment_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(enrollment_id): Path<String>,
) -> ApiResult<Value> {
    let enrollment = state.enrollments().unenroll(&identity, &enrollment_id).await?;
    Ok(ApiResponse::success(json!({
        "message": "Unenrolled successfully",
        "id": enrollment.id,
    })))
}

/// PUT /api/enrollments/:enrollment_id/progress
pub async fn progress_put(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(enrollment_id): Path<String>,
    ApiJson(change): ApiJson<ProgressUpdate>,
) -> ApiResult<Enrollment> {
    let enrollment = state
        .enrollments()
        .update_progress(&identity, &enrollment_id, change)
        .await?;
    Ok(ApiResponse::success(enrollment))
}
