//! User model and registration field rules.
//!
//! # Invariants
//! - `email` is unique; the domain part is stored lowercase.
//! - `handle` is unique, 1..=150 chars of `[A-Za-z0-9_.+@-]`.

use crate::error::{FieldError, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

const HANDLE_MAX_CHARS: usize = 150;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.+@-]+$").expect("valid handle regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub handle: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub handle: String,
}

impl NewUser {
    /// Validates and normalizes raw registration fields.
    ///
    /// Collects every field failure instead of stopping at the first.
    pub fn parse(email: &str, handle: &str) -> Result<Self, ValidationError> {
        let mut fields = Vec::new();

        let email = normalize_email(email);
        if email.is_empty() {
            fields.push(FieldError::new("email", "email is required"));
        } else if !EMAIL_RE.is_match(&email) {
            fields.push(FieldError::new("email", "email is not a valid address"));
        }

        let handle = handle.trim().to_string();
        if handle.is_empty() {
            fields.push(FieldError::new("handle", "handle is required"));
        } else if handle.chars().count() > HANDLE_MAX_CHARS {
            fields.push(FieldError::new(
                "handle",
                format!("handle must be at most {HANDLE_MAX_CHARS} characters"),
            ));
        } else if !HANDLE_RE.is_match(&handle) {
            fields.push(FieldError::new(
                "handle",
                "handle may only contain letters, digits and _ . + @ -",
            ));
        }

        if fields.is_empty() {
            Ok(Self { email, handle })
        } else {
            Err(ValidationError { fields })
        }
    }
}

/// Trims the address and lowercases its domain part.
pub fn normalize_email(email: &str) -> String {
    let trimmed = email.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}
