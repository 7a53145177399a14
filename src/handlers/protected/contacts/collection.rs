use axum::extract::{Query, State};
use axum::Extension;

use crate::api::ApiJson;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::{Contact, CreateContactRequest};
use crate::state::AppState;

use super::utils::PageQuery;

/// GET /api/contacts - page through the caller's contacts in creation order.
pub async fn contacts_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<Contact>> {
    let page = query.resolve()?;
    let contacts = state.contacts.list(auth.id, page).await?;

    Ok(ApiResponse::success(contacts))
}

/// POST /api/contacts - add a contact to the caller's book.
pub async fn contacts_post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(payload): ApiJson<CreateContactRequest>,
) -> ApiResult<Contact> {
    let draft = payload.validate()?;
    let contact = state.contacts.create(auth.id, draft).await?;

    tracing::debug!("Created contact {} for {}", contact.id, auth.id);

    Ok(ApiResponse::created(contact))
}
