use axum::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, MaybeIdentity};

/// GET /api/auth/whoami - the caller's resolved identity, if any
pub async fn whoami_get(Extension(MaybeIdentity(identity)): Extension<MaybeIdentity>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "authenticated": identity.is_some(),
        "user": identity,
    })))
}
