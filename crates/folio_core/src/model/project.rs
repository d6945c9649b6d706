//! Project model and metadata rules.
//!
//! # Invariants
//! - `owner_id` never changes after creation.
//! - `title` is 3..=200 chars after trimming.

use crate::error::{FieldError, ValidationError};
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ProjectId = Uuid;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Partial metadata update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }

    /// Validates present fields and returns the normalized patch.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let title = match self.title {
            Some(title) => Some(validate_title(&title).map_err(|field| ValidationError {
                fields: vec![field],
            })?),
            None => None,
        };
        Ok(Self {
            title,
            description: self.description,
        })
    }
}

/// Trims and length-checks a project title.
pub fn validate_title(title: &str) -> Result<String, FieldError> {
    let trimmed = title.trim();
    let chars = trimmed.chars().count();
    if chars == 0 {
        return Err(FieldError::new("title", "title is required"));
    }
    if chars < TITLE_MIN_CHARS || chars > TITLE_MAX_CHARS {
        return Err(FieldError::new(
            "title",
            format!("title must be between {TITLE_MIN_CHARS} and {TITLE_MAX_CHARS} characters"),
        ));
    }
    Ok(trimmed.to_string())
}
