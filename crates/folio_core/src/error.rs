//! Caller-facing error taxonomy.
//!
//! # Responsibility
//! - Collapse repository, lock and bootstrap failures into the four outcomes
//!   callers may observe: validation, not-found, conflict, internal.
//! - Keep storage details out of caller-visible messages.
//!
//! # Invariants
//! - Ownership mismatches and missing rows produce the same `NotFound` value.
//! - Only `Conflict` is retryable.
//! - `Internal` displays a generic message; detail stays in `source()` and logs.

use crate::access::doc_locks::LockError;
use crate::db::DbError;
use crate::logging::sanitize_message;
use crate::model::document::DocumentId;
use crate::repo::RepoError;
use log::error;
use rusqlite::ErrorCode;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

const MAX_LOGGED_ERROR_CHARS: usize = 240;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Input rejected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError::new(field, message)],
        }
    }

    /// Returns whether `field` is among the rejected fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|item| item.field == field)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .fields
            .iter()
            .map(|item| format!("{}: {}", item.field, item.message))
            .collect::<Vec<_>>();
        write!(f, "validation failed ({})", parts.join("; "))
    }
}

impl Error for ValidationError {}

/// Entity kinds named by `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Project,
    Document,
    History,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Document => "document",
            Self::History => "history",
        }
    }
}

/// Wraps an unexpected failure without exposing it through `Display`.
#[derive(Debug)]
pub struct InternalError {
    source: Box<dyn Error + Send + Sync + 'static>,
}

impl InternalError {
    fn new(source: impl Error + Send + Sync + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "internal error")
    }
}

impl Error for InternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Error returned by every caller-facing operation.
#[derive(Debug)]
pub enum CoreError {
    Validation(ValidationError),
    NotFound { kind: EntityKind, id: String },
    Conflict { document_id: Option<DocumentId> },
    Internal(InternalError),
}

impl CoreError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Returns whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub(crate) fn internal(source: impl Error + Send + Sync + 'static) -> Self {
        let detail = sanitize_message(&source.to_string(), MAX_LOGGED_ERROR_CHARS);
        error!("event=internal_error module=core status=error error={detail}");
        Self::Internal(InternalError::new(source))
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::Conflict { .. } => {
                write!(f, "document is busy with another write; retry the request")
            }
            Self::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Internal(err) => Some(err),
            Self::NotFound { .. } | Self::Conflict { .. } => None,
        }
    }
}

impl From<ValidationError> for CoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<LockError> for CoreError {
    fn from(value: LockError) -> Self {
        match value {
            LockError::TimedOut { document_id, .. } => Self::Conflict {
                document_id: Some(document_id),
            },
        }
    }
}

impl From<DbError> for CoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) if is_contention(&err) => Self::Conflict { document_id: None },
            other => Self::internal(other),
        }
    }
}

impl From<RepoError> for CoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::UniqueViolation { field } => {
                Self::Validation(ValidationError::single(field, format!("{field} is already taken")))
            }
            RepoError::Db(err) => err.into(),
            other => Self::internal(other),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(value: rusqlite::Error) -> Self {
        DbError::Sqlite(value).into()
    }
}

fn is_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy) | Some(ErrorCode::DatabaseLocked)
    )
}

#[cfg(test)]
mod tests {
    use super::{CoreError, EntityKind, ValidationError};
    use std::error::Error;
    use std::io;

    #[test]
    fn internal_error_hides_detail_from_display() {
        let err = CoreError::internal(io::Error::new(io::ErrorKind::Other, "disk /var/x gone"));
        assert_eq!(err.to_string(), "internal error");
        let source = err.source().and_then(|inner| inner.source());
        assert!(source
            .map(|inner| inner.to_string().contains("disk"))
            .unwrap_or(false));
        assert!(!err.is_retryable());
    }

    #[test]
    fn only_conflict_is_retryable() {
        assert!(CoreError::Conflict { document_id: None }.is_retryable());
        assert!(!CoreError::not_found(EntityKind::Project, "x").is_retryable());
        assert!(!CoreError::from(ValidationError::single("title", "too short")).is_retryable());
    }

    #[test]
    fn busy_sqlite_error_maps_to_conflict() {
        let busy = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(
            CoreError::from(busy),
            CoreError::Conflict { document_id: None }
        ));
    }
}
