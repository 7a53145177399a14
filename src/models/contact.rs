use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

use super::{checked, EMAIL_RE};

pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MAX_CHARS: usize = 250;
pub const PHONE_MAX_CHARS: usize = 30;
pub const NOTES_MAX_CHARS: usize = 5000;

/// Digit count after separators are stripped; an optional leading + is kept.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid phone regex"));

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Contact {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birth_date: NaiveDate,
    pub additional_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated payload for creating a contact. Values are already trimmed.
#[derive(Debug, Clone)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub birth_date: NaiveDate,
    pub additional_info: Option<String>,
}

/// Validated partial update. An outer `None` leaves the stored value
/// untouched; `additional_info: Some(None)` clears the notes.
#[derive(Debug, Clone, Default)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub additional_info: Option<Option<String>>,
}

impl ContactPatch {
    pub fn has_changes(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.email.is_some()
            || self.phone_number.is_some()
            || self.birth_date.is_some()
            || self.additional_info.is_some()
    }
}

/// Everything optional at the serde level so a request missing several fields
/// still reports every one of them, not just the first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub birth_date: Option<String>,
    pub additional_info: Option<String>,
}

impl CreateContactRequest {
    pub fn validate(self) -> Result<NewContact, ApiError> {
        let mut errors = HashMap::new();

        let first_name = checked(&mut errors, "first_name", validate_name(self.first_name.as_deref()));
        let last_name = checked(&mut errors, "last_name", validate_name(self.last_name.as_deref()));
        let email = checked(&mut errors, "email", validate_email(self.email.as_deref()));
        let phone_number = checked(&mut errors, "phone_number", validate_phone(self.phone_number.as_deref()));
        let birth_date = checked(&mut errors, "birth_date", validate_birth_date(self.birth_date.as_deref()));
        let additional_info = checked(&mut errors, "additional_info", validate_notes(self.additional_info.as_deref()));

        match (first_name, last_name, email, phone_number, birth_date, additional_info) {
            (Some(first_name), Some(last_name), Some(email), Some(phone_number), Some(birth_date), Some(additional_info))
                if errors.is_empty() =>
            {
                Ok(NewContact {
                    first_name,
                    last_name,
                    email,
                    phone_number,
                    birth_date,
                    additional_info,
                })
            }
            _ => Err(ApiError::validation_error("Validation failed", Some(errors))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub birth_date: Option<String>,
    pub additional_info: Option<String>,
}

impl UpdateContactRequest {
    /// Validates only the fields that were supplied.
    pub fn validate(self) -> Result<ContactPatch, ApiError> {
        let mut errors = HashMap::new();
        let mut patch = ContactPatch::default();

        if let Some(value) = self.first_name {
            patch.first_name = checked(&mut errors, "first_name", validate_name(Some(&value)));
        }
        if let Some(value) = self.last_name {
            patch.last_name = checked(&mut errors, "last_name", validate_name(Some(&value)));
        }
        if let Some(value) = self.email {
            patch.email = checked(&mut errors, "email", validate_email(Some(&value)));
        }
        if let Some(value) = self.phone_number {
            patch.phone_number = checked(&mut errors, "phone_number", validate_phone(Some(&value)));
        }
        if let Some(value) = self.birth_date {
            patch.birth_date = checked(&mut errors, "birth_date", validate_birth_date(Some(&value)));
        }
        if let Some(value) = self.additional_info {
            patch.additional_info = checked(&mut errors, "additional_info", validate_notes(Some(&value)));
        }

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(ApiError::validation_error("Validation failed", Some(errors)))
        }
    }
}

fn validate_name(value: Option<&str>) -> Result<String, String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(format!("must be at most {} characters", NAME_MAX_CHARS));
    }
    Ok(trimmed.to_string())
}

fn validate_email(value: Option<&str>) -> Result<String, String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    if trimmed.chars().count() > EMAIL_MAX_CHARS || !EMAIL_RE.is_match(trimmed) {
        return Err("must be a valid email address".to_string());
    }
    Ok(trimmed.to_string())
}

fn validate_phone(value: Option<&str>) -> Result<String, String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    if trimmed.chars().count() > PHONE_MAX_CHARS {
        return Err(format!("must be at most {} characters", PHONE_MAX_CHARS));
    }
    // Accept common separators, validate what remains
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-' | '.'))
        .collect();
    if !PHONE_RE.is_match(&cleaned) {
        return Err("must contain 7 to 15 digits, with an optional leading +".to_string());
    }
    Ok(trimmed.to_string())
}

fn validate_birth_date(value: Option<&str>) -> Result<NaiveDate, String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| "must be a date in YYYY-MM-DD format".to_string())
}

/// Notes are optional; blank input clears them.
fn validate_notes(value: Option<&str>) -> Result<Option<String>, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.chars().count() > NOTES_MAX_CHARS => {
            Err(format!("must be at most {} characters", NOTES_MAX_CHARS))
        }
        Some(s) => Ok(Some(s.to_string())),
    }
}
