use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{self, TokenScope, CREDENTIALS_MESSAGE};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context injected into protected requests.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Guard for the protected router. Accepts only a bearer access token whose
/// subject still exists, and answers every credential failure with the same
/// 401 so callers learn nothing about which check failed.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;

    let claims = auth::verify_token(&token, TokenScope::Access)?;

    let user = state
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;

    let auth_user = AuthUser {
        id: user.id,
        username: user.username,
        email: user.email,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
