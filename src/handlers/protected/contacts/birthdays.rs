use axum::extract::{Query, State};
use axum::Extension;
use chrono::Utc;
use serde::Deserialize;

use crate::config;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::models::Contact;
use crate::state::AppState;

use super::utils::parse_non_negative;

#[derive(Debug, Default, Deserialize)]
pub struct BirthdayQuery {
    days: Option<String>,
}

/// GET /api/contacts/upcoming-birthdays?days= - contacts whose next
/// birthday falls within the window, both ends inclusive. The window
/// defaults from config; a birthday today always counts.
pub async fn upcoming_birthdays_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<BirthdayQuery>,
) -> ApiResult<Vec<Contact>> {
    let window_days = parse_non_negative("days", query.days.as_deref())?
        .unwrap_or(config::config().api.default_birthday_window_days);

    let today = Utc::now().date_naive();
    let contacts = state
        .contacts
        .upcoming_birthdays(auth.id, today, window_days)
        .await?;

    Ok(ApiResponse::success(contacts))
}
