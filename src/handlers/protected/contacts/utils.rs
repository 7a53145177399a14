use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::Page;
use crate::error::ApiError;

/// Pagination parameters accepted by the list and search endpoints.
///
/// Values arrive as raw strings so that junk like `offset=abc` gets the
/// same JSON 400 as any other bad input instead of axum's plain-text
/// query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    offset: Option<String>,
    limit: Option<String>,
}

impl PageQuery {
    /// Apply defaults and the configured ceiling. Negative or non-numeric
    /// values are the caller's error; an oversized limit is just clamped.
    pub fn resolve(&self) -> Result<Page, ApiError> {
        let api = &config::config().api;

        let offset = parse_non_negative("offset", self.offset.as_deref())?.unwrap_or(0);
        let limit = parse_non_negative("limit", self.limit.as_deref())?
            .unwrap_or(api.default_page_limit)
            .min(api.max_page_limit);

        Ok(Page { offset, limit })
    }
}

pub fn parse_non_negative(name: &str, raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    let Some(raw) = raw else { return Ok(None) };

    match raw.trim().parse::<i64>() {
        Ok(value) if value >= 0 => Ok(Some(value)),
        _ => Err(ApiError::invalid_argument(format!(
            "{} must be a non-negative integer",
            name
        ))),
    }
}

/// Parse a contact id out of the path, answering a field-level 400 for
/// anything that is not a UUID.
pub fn parse_contact_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        let mut field_errors = HashMap::new();
        field_errors.insert("id".to_string(), format!("Invalid UUID format: {}", raw));
        ApiError::validation_error("Invalid field format", Some(field_errors))
    })
}
