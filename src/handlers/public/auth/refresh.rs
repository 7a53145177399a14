use axum::extract::State;
use axum::http::HeaderMap;

use crate::auth::{self, TokenPair, TokenScope, CREDENTIALS_MESSAGE};
use crate::error::ApiError;
use crate::middleware::{extract_bearer_token, ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /auth/refresh - trade a bearer refresh token for a fresh pair.
///
/// Only the most recently issued refresh token is good: issuing a new pair
/// stores its refresh half, which retires the old one. Presenting a retired
/// token clears the stored one too, forcing a fresh login.
pub async fn refresh_post(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<TokenPair> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;

    let claims = auth::verify_token(&token, TokenScope::Refresh)?;

    let user = state
        .users
        .get(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;

    if user.refresh_token.as_deref() != Some(token.as_str()) {
        tracing::warn!("Stale refresh token presented for {}", user.id);
        state.users.set_refresh_token(user.id, None).await?;
        return Err(ApiError::unauthorized("Invalid refresh token"));
    }

    let pair = auth::issue_token_pair(&user)?;
    state
        .users
        .set_refresh_token(user.id, Some(pair.refresh_token.clone()))
        .await?;

    Ok(ApiResponse::success(pair))
}
