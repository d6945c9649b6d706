//! Core domain logic for Folio.
//! Projects own exactly one document; every content change leaves an
//! append-only snapshot of what it replaced.

pub mod access;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use access::doc_locks::{DocumentLocks, LockError};
pub use api::{document_locks, open_connection, FolioApi};
pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory, open_db_with_busy_timeout, DbError, DbResult};
pub use error::{CoreError, CoreResult, EntityKind, FieldError, ValidationError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::document::{Document, DocumentId, DocumentWrite, HistoryEntry, HistoryId};
pub use model::identity::Identity;
pub use model::page::Page;
pub use model::project::{Project, ProjectId, ProjectPatch};
pub use model::user::{User, UserId};
pub use repo::document_repo::DocumentMatch;
pub use service::analytics_service::AnalyticsSummary;
pub use service::project_service::DeleteConfirmation;
pub use service::query_service::{ProjectFilter, SearchResults};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
