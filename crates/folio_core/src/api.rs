//! Operation surface for callers that already resolved an identity.
//!
//! # Responsibility
//! - Expose the project/document/history/query/analytics use-cases over one
//!   SQLite connection.
//! - Share one `DocumentLocks` registry across every connection of a process.
//!
//! # Invariants
//! - Every method that addresses an entity runs the ownership guard.
//! - The facade holds no mutable state of its own; cloning the lock `Arc`
//!   into another facade over another connection is the supported way to
//!   serve parallel callers.

use crate::access::doc_locks::DocumentLocks;
use crate::access::guard::OwnershipGuard;
use crate::config::CoreConfig;
use crate::db::{open_db_in_memory, open_db_with_busy_timeout, DbResult};
use crate::error::CoreResult;
use crate::model::document::{Document, DocumentId, DocumentWrite, HistoryEntry, HistoryId};
use crate::model::identity::Identity;
use crate::model::page::Page;
use crate::model::project::{Project, ProjectId, ProjectPatch};
use crate::model::user::User;
use crate::repo::document_repo::{DocumentMatch, SqliteDocumentRepository};
use crate::repo::history_repo::SqliteHistoryRepository;
use crate::repo::owner_repo::SqliteOwnerLookup;
use crate::repo::project_repo::SqliteProjectRepository;
use crate::repo::stats_repo::SqliteStatsRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::service::analytics_service::{AnalyticsService, AnalyticsSummary};
use crate::service::document_service::DocumentService;
use crate::service::history_service::HistoryService;
use crate::service::project_service::{DeleteConfirmation, ProjectService};
use crate::service::query_service::{ProjectFilter, QueryService, SearchResults};
use crate::service::user_service::UserService;
use rusqlite::Connection;
use std::sync::Arc;

type SqliteProjectService<'a, 'conn> = ProjectService<
    'a,
    SqliteProjectRepository<'conn>,
    SqliteDocumentRepository<'conn>,
    SqliteOwnerLookup<'conn>,
>;

/// Opens the connection described by `config` (file when `db_path` is set,
/// otherwise in-memory).
pub fn open_connection(config: &CoreConfig) -> DbResult<Connection> {
    match config.db_path.as_ref() {
        Some(path) => open_db_with_busy_timeout(path, config.busy_timeout),
        None => open_db_in_memory(),
    }
}

/// Builds the process-wide lock registry for `config`.
pub fn document_locks(config: &CoreConfig) -> Arc<DocumentLocks> {
    Arc::new(DocumentLocks::new(config.lock_wait))
}

pub struct FolioApi<'conn> {
    conn: &'conn Connection,
    locks: Arc<DocumentLocks>,
    config: CoreConfig,
    guard: OwnershipGuard<SqliteOwnerLookup<'conn>>,
}

impl<'conn> FolioApi<'conn> {
    pub fn new(conn: &'conn Connection, locks: Arc<DocumentLocks>, config: CoreConfig) -> Self {
        Self {
            conn,
            locks,
            config,
            guard: OwnershipGuard::new(SqliteOwnerLookup::new(conn)),
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn register_user(&self, email: &str, handle: &str) -> CoreResult<User> {
        self.users().register_user(email, handle)
    }

    pub fn get_profile(&self, identity: &Identity) -> CoreResult<User> {
        self.users().get_profile(identity)
    }

    pub fn identity_for_email(&self, email: &str) -> CoreResult<Identity> {
        self.users().identity_for_email(email)
    }

    pub fn create_project(
        &self,
        identity: &Identity,
        title: &str,
        description: &str,
    ) -> CoreResult<ProjectId> {
        self.projects()
            .create_project(identity, title, description)
            .map(|project| project.id)
    }

    pub fn get_project(&self, identity: &Identity, project_id: ProjectId) -> CoreResult<Project> {
        self.projects().get_project(identity, project_id)
    }

    pub fn list_projects(
        &self,
        identity: &Identity,
        filter: &ProjectFilter,
    ) -> CoreResult<Page<Project>> {
        self.queries().list_projects(identity, filter)
    }

    pub fn update_project_metadata(
        &self,
        identity: &Identity,
        project_id: ProjectId,
        title: Option<String>,
        description: Option<String>,
    ) -> CoreResult<Project> {
        self.projects().update_project_metadata(
            identity,
            project_id,
            ProjectPatch { title, description },
        )
    }

    pub fn delete_project(
        &self,
        identity: &Identity,
        project_id: ProjectId,
    ) -> CoreResult<DeleteConfirmation> {
        self.projects().delete_project(identity, project_id)
    }

    pub fn get_document(&self, identity: &Identity, project_id: ProjectId) -> CoreResult<Document> {
        self.documents().get_document(identity, project_id)
    }

    pub fn get_document_by_id(
        &self,
        identity: &Identity,
        document_id: DocumentId,
    ) -> CoreResult<Document> {
        self.documents().get_document_by_id(identity, document_id)
    }

    pub fn update_document(
        &self,
        identity: &Identity,
        project_id: ProjectId,
        content: &str,
    ) -> CoreResult<DocumentWrite> {
        self.documents()
            .update_document(identity, project_id, content)
    }

    pub fn list_history(
        &self,
        identity: &Identity,
        document_id: DocumentId,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> CoreResult<Page<HistoryEntry>> {
        self.history()
            .list_history(identity, document_id, page, page_size)
    }

    pub fn recent_history(
        &self,
        identity: &Identity,
        document_id: DocumentId,
        limit: Option<u32>,
    ) -> CoreResult<Vec<HistoryEntry>> {
        self.history().recent_history(identity, document_id, limit)
    }

    pub fn get_history_entry(
        &self,
        identity: &Identity,
        history_id: HistoryId,
    ) -> CoreResult<HistoryEntry> {
        self.history().get_entry(identity, history_id)
    }

    pub fn get_analytics(&self, identity: &Identity) -> CoreResult<AnalyticsSummary> {
        AnalyticsService::new(SqliteStatsRepository::new(self.conn), &self.config)
            .summary(identity)
    }

    pub fn search_documents(
        &self,
        identity: &Identity,
        needle: &str,
    ) -> CoreResult<Vec<DocumentMatch>> {
        self.queries().search_documents(identity, needle)
    }

    pub fn search_projects_and_documents(
        &self,
        identity: &Identity,
        query: &str,
    ) -> CoreResult<SearchResults> {
        self.queries()
            .search_projects_and_documents(identity, query)
    }

    fn users(&self) -> UserService<SqliteUserRepository<'conn>> {
        UserService::new(SqliteUserRepository::new(self.conn))
    }

    fn projects(&self) -> SqliteProjectService<'_, 'conn> {
        ProjectService::new(
            SqliteProjectRepository::new(self.conn),
            SqliteDocumentRepository::new(self.conn),
            &self.guard,
            &self.locks,
            &self.config.placeholder_content,
        )
    }

    fn documents(
        &self,
    ) -> DocumentService<'_, SqliteDocumentRepository<'conn>, SqliteOwnerLookup<'conn>> {
        DocumentService::new(
            SqliteDocumentRepository::new(self.conn),
            &self.guard,
            &self.locks,
            &self.config.placeholder_content,
        )
    }

    fn history(
        &self,
    ) -> HistoryService<'_, SqliteHistoryRepository<'conn>, SqliteOwnerLookup<'conn>> {
        HistoryService::new(
            SqliteHistoryRepository::new(self.conn),
            &self.guard,
            &self.config,
        )
    }

    fn queries(
        &self,
    ) -> QueryService<'_, SqliteProjectRepository<'conn>, SqliteDocumentRepository<'conn>> {
        QueryService::new(
            SqliteProjectRepository::new(self.conn),
            SqliteDocumentRepository::new(self.conn),
            &self.config,
        )
    }
}
