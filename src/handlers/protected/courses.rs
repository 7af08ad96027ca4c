use axum::{extract::State, Extension};
use serde_json::{json, Value};

use crate::auth::Identity;
use crate::database::Document;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, OwnedCourse};
use crate::state::AppState;

/// POST /api/courses - create a course owned by the caller
pub async fn course_post(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Document> {
    let course = state.courses().create(&payload, &identity).await?;
    Ok(ApiResponse::created(course))
}

/// PUT /api/courses/:id - partial update by the owner
pub async fn course_put(
    State(state): State<AppState>,
    Extension(OwnedCourse(course)): Extension<OwnedCourse>,
    ApiJson(payload): ApiJson<Value>,
) -> ApiResult<Document> {
    let updated = state.courses().update(&course, &payload).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/courses/:id - refused while enrollments exist
pub async fn course_delete(
    State(state): State<AppState>,
    Extension(OwnedCourse(course)): Extension<OwnedCourse>,
) -> ApiResult<Value> {
    state.courses().delete(&course.id).await?;
    Ok(ApiResponse::success(json!({
        "message": "Course deleted successfully",
        "id": course.id,
    })))
}
