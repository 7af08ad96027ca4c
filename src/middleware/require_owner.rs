use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

use crate::auth::Identity;
use crate::database::models::owner_id;
use crate::database::Document;
use crate::error::ApiError;
use crate::state::AppState;

/// The course named by the `:id` path parameter, loaded and owned by the caller
#[derive(Clone, Debug)]
pub struct OwnedCourse(pub Document);

/// Course ownership gate. Must run after `require_auth`.
///
/// 404 when the course is missing, 403 when the caller does not own it.
pub async fn require_course_owner(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = request
        .extensions()
        .get::<Identity>()
        .map(|identity| identity.uid.clone())
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    let course_id = params
        .get("id")
        .ok_or_else(|| ApiError::bad_request("Missing course id"))?;

    let course = state
        .courses()
        .find(course_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;

    if owner_id(&course) != Some(caller.as_str()) {
        tracing::warn!("{} is not the owner of course {}", caller, course.id);
        return Err(ApiError::forbidden("You can only modify your own courses"));
    }

    request.extensions_mut().insert(OwnedCourse(course));
    Ok(next.run(request).await)
}
