use axum::extract::{Path, State};

use crate::database::Document;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/courses - published courses
pub async fn courses_get(State(state): State<AppState>) -> ApiResult<Vec<Document>> {
    let courses = state.courses().list_published().await?;
    Ok(ApiResponse::success(courses))
}

/// GET /api/courses/:id - single course; counts a view
pub async fn course_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    let course = state.courses().view(&id).await?;
    Ok(ApiResponse::success(course))
}

/// GET /api/courses/instructor/:instructor_id - every course of one instructor
pub async fn instructor_courses_get(
    State(state): State<AppState>,
    Path(instructor_id): Path<String>,
) -> ApiResult<Vec<Document>> {
    let courses = state.courses().list_by_instructor(&instructor_id).await?;
    Ok(ApiResponse::success(courses))
}
