use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::Identity;
use crate::error::ApiError;

/// Instructor-only routes. Must run after `require_auth`.
pub async fn require_instructor(request: Request, next: Next) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !identity.is_instructor() {
        tracing::warn!("{} ({}) denied instructor route {}", identity.uid, identity.role, request.uri().path());
        return Err(ApiError::forbidden("Instructor role required"));
    }

    Ok(next.run(request).await)
}
