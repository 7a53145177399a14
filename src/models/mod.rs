use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

pub mod contact;
pub mod user;

pub use contact::{Contact, ContactPatch, CreateContactRequest, NewContact, UpdateContactRequest};
pub use user::{Credentials, LoginRequest, NewUser, PublicUser, RegisterRequest, Registration, User};

/// Deliberately loose: something@something.something, no whitespace.
/// Deliverability is the mail server's problem, not ours.
pub(crate) static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Record a per-field validation result, collecting the message on failure.
pub(crate) fn checked<T>(
    errors: &mut HashMap<String, String>,
    field: &str,
    result: Result<T, String>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.insert(field.to_string(), message);
            None
        }
    }
}
