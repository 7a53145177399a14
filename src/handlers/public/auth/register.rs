use axum::extract::State;

use crate::api::ApiJson;
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{NewUser, PublicUser, RegisterRequest};
use crate::services;
use crate::state::AppState;

/// POST /auth/register - create a new account.
///
/// The password is hashed with bcrypt before it is stored and the avatar
/// defaults to the Gravatar for the address. A duplicate address answers
/// 409 without touching the existing account.
pub async fn register_post(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<PublicUser> {
    let registration = payload.validate()?;

    let cost = config::config().security.bcrypt_cost;
    let password_hash = bcrypt::hash(&registration.password, cost).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal_server_error("Failed to create account")
    })?;

    let avatar = services::gravatar_url(&registration.email);

    let user = state
        .users
        .create(NewUser {
            username: registration.username,
            email: registration.email,
            password_hash,
            avatar: Some(avatar),
        })
        .await?;

    tracing::info!("Registered account {}", user.id);

    Ok(ApiResponse::created(PublicUser::from(user)))
}
