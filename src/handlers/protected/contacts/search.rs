use axum::extract::{Query, State};
use axum::Extension;
use serde::Deserialize;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::Contact;
use crate::state::AppState;

use super::utils::PageQuery;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    query: String,
    // String-typed fields, so flattening survives the urlencoded format
    #[serde(flatten)]
    page: PageQuery,
}

/// GET /api/contacts/search?query= - case-insensitive substring match over
/// first name, last name and email, scoped to the caller. A blank term
/// behaves exactly like the plain listing.
pub async fn search_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Vec<Contact>> {
    let page = params.page.resolve()?;
    let contacts = state.contacts.search(auth.id, &params.query, page).await?;

    Ok(ApiResponse::success(contacts))
}
