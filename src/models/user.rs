use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ApiError;

use super::{checked, EMAIL_RE};

pub const USERNAME_MIN_CHARS: usize = 5;
pub const USERNAME_MAX_CHARS: usize = 16;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 24;

/// Full user row. Deliberately not Serialize: the password hash and stored
/// refresh token must never reach a response body. Use [`PublicUser`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Wire-safe projection of a user row.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

/// Insert payload for the user store; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated registration input; the password is still plaintext here and
/// gets hashed by the handler.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, ApiError> {
        let mut errors = HashMap::new();

        let username = checked(&mut errors, "username", validate_username(self.username.as_deref()));
        let email = checked(&mut errors, "email", validate_user_email(self.email.as_deref()));
        let password = checked(&mut errors, "password", validate_password(self.password.as_deref()));

        match (username, email, password) {
            (Some(username), Some(email), Some(password)) if errors.is_empty() => Ok(Registration {
                username,
                email,
                password,
            }),
            _ => Err(ApiError::validation_error("Validation failed", Some(errors))),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    /// Presence check only. Whether the pair matches anything is answered
    /// with a 401, never with field-level hints.
    pub fn validate(self) -> Result<Credentials, ApiError> {
        let mut errors = HashMap::new();

        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() {
            errors.insert("email".to_string(), "must not be empty".to_string());
        }
        let password = self.password.as_deref().unwrap_or_default();
        if password.is_empty() {
            errors.insert("password".to_string(), "must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(Credentials {
                email: email.to_string(),
                password: password.to_string(),
            })
        } else {
            Err(ApiError::validation_error("Validation failed", Some(errors)))
        }
    }
}

fn validate_username(value: Option<&str>) -> Result<String, String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    let count = trimmed.chars().count();
    if count < USERNAME_MIN_CHARS || count > USERNAME_MAX_CHARS {
        return Err(format!(
            "must be between {} and {} characters",
            USERNAME_MIN_CHARS, USERNAME_MAX_CHARS
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_user_email(value: Option<&str>) -> Result<String, String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err("must not be empty".to_string());
    }
    if trimmed.chars().count() > super::contact::EMAIL_MAX_CHARS || !EMAIL_RE.is_match(trimmed) {
        return Err("must be a valid email address".to_string());
    }
    Ok(trimmed.to_string())
}

// Not trimmed: leading/trailing spaces are part of the password.
fn validate_password(value: Option<&str>) -> Result<String, String> {
    let password = value.unwrap_or_default();
    let count = password.chars().count();
    if count < PASSWORD_MIN_CHARS || count > PASSWORD_MAX_CHARS {
        return Err(format!(
            "must be between {} and {} characters",
            PASSWORD_MIN_CHARS, PASSWORD_MAX_CHARS
        ));
    }
    Ok(password.to_string())
}
