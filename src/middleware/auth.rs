use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{bearer_token, resolve_identity, AuthError, Identity};
use crate::error::ApiError;
use crate::state::AppState;

/// Identity for endpoints that serve both anonymous and signed-in callers
#[derive(Clone, Debug, Default)]
pub struct MaybeIdentity(pub Option<Identity>);

/// Owned copy of the Authorization header value
fn authorization_header(request: &Request) -> Result<Option<String>, AuthError> {
    request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map(str::to_string).map_err(|_| AuthError::InvalidScheme))
        .transpose()
}

async fn authenticate(state: &AppState, header: Option<String>) -> Result<Identity, AuthError> {
    let token = bearer_token(header.as_deref())?;
    let verified = state.verifier.verify(token).await?;
    Ok(resolve_identity(verified, &state.role_policy()))
}

/// Bearer token authentication; attaches `Identity` or rejects with 401
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = authorization_header(&request)?;
    let identity = authenticate(&state, header).await?;
    tracing::debug!("Authenticated {} as {}", identity.uid, identity.role);
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Like `require_auth`, but any failure continues anonymously
pub async fn optional_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header = authorization_header(&request);
    let authenticated = match header {
        Ok(header) => authenticate(&state, header).await,
        Err(e) => Err(e),
    };
    let identity = match authenticated {
        Ok(identity) => Some(identity),
        Err(AuthError::MissingHeader) => None,
        Err(e) => {
            tracing::debug!("Continuing anonymously: {}", e);
            None
        }
    };
    if let Some(identity) = &identity {
        request.extensions_mut().insert(identity.clone());
    }
    request.extensions_mut().insert(MaybeIdentity(identity));

    next.run(request).await
}
