use axum::extract::State;
use axum::Extension;

use crate::auth::CREDENTIALS_MESSAGE;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::PublicUser;
use crate::state::AppState;

/// GET /api/users/me - public profile of the authenticated account.
pub async fn me_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<PublicUser> {
    // The account can disappear between the guard and here
    let user = state
        .users
        .get(auth.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized(CREDENTIALS_MESSAGE))?;

    Ok(ApiResponse::success(PublicUser::from(user)))
}
