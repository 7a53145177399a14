use axum::extract::{Path, State};
use axum::Extension;

use crate::api::ApiJson;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Contact, UpdateContactRequest};
use crate::state::AppState;

use super::utils::parse_contact_id;

const CONTACT_NOT_FOUND: &str = "Contact not found";

/// GET /api/contacts/:id - fetch one contact. Someone else's id answers
/// the same 404 as a missing one.
pub async fn contact_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Contact> {
    let id = parse_contact_id(&id)?;

    let contact = state
        .contacts
        .get(auth.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found(CONTACT_NOT_FOUND))?;

    Ok(ApiResponse::success(contact))
}

/// PUT and PATCH /api/contacts/:id - merge the supplied fields into the
/// contact. Both verbs take the same partial body; a body with nothing
/// to change is rejected.
pub async fn contact_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateContactRequest>,
) -> ApiResult<Contact> {
    let id = parse_contact_id(&id)?;
    let patch = payload.validate()?;

    if !patch.has_changes() {
        return Err(ApiError::invalid_argument(
            "At least one field must be provided",
        ));
    }

    let contact = state
        .contacts
        .update(auth.id, id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found(CONTACT_NOT_FOUND))?;

    Ok(ApiResponse::success(contact))
}

/// DELETE /api/contacts/:id - remove a contact, answering 204.
pub async fn contact_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = parse_contact_id(&id)?;

    if !state.contacts.delete(auth.id, id).await? {
        return Err(ApiError::not_found(CONTACT_NOT_FOUND));
    }

    tracing::debug!("Deleted contact {} for {}", id, auth.id);

    Ok(ApiResponse::<()>::no_content())
}
