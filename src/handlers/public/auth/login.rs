use axum::extract::State;

use crate::api::ApiJson;
use crate::auth::{self, TokenPair};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::LoginRequest;
use crate::state::AppState;

const LOGIN_FAILED: &str = "Invalid email or password";

/// POST /auth/login - verify credentials and issue a token pair.
///
/// Unknown address and wrong password answer with the same 401, so the
/// endpoint cannot be used to probe which accounts exist.
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<TokenPair> {
    let credentials = payload.validate()?;

    let user = state
        .users
        .get_by_email(&credentials.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized(LOGIN_FAILED))?;

    let password_ok = bcrypt::verify(&credentials.password, &user.password_hash).unwrap_or(false);
    if !password_ok {
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    }

    let pair = auth::issue_token_pair(&user)?;
    state
        .users
        .set_refresh_token(user.id, Some(pair.refresh_token.clone()))
        .await?;

    tracing::debug!("Issued token pair for {}", user.id);

    Ok(ApiResponse::success(pair))
}
