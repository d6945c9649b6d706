//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create a project together with its document in one transaction.
//! - Provide owner-scoped listing with substring/date filters and ordering.
//! - Delete projects; documents and history follow through FK cascades.
//!
//! # Invariants
//! - No caller ever observes a project row without its document row.
//! - List ordering always ends with `id` as a deterministic tie-breaker.

use crate::error::EntityKind;
use crate::model::document::Document;
use crate::model::now_epoch_ms;
use crate::model::project::{Project, ProjectId, ProjectPatch};
use crate::model::user::UserId;
use crate::repo::{begin_write, count_to_u64, parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

const PROJECT_SELECT_SQL: &str = "SELECT id, owner_id, title, description, created_at FROM projects";

/// Sort key for project listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectSortField {
    CreatedAt,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectOrder {
    pub field: ProjectSortField,
    pub descending: bool,
}

impl Default for ProjectOrder {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: ProjectSortField::CreatedAt,
            descending: true,
        }
    }
}

impl ProjectOrder {
    fn to_sql(self) -> &'static str {
        match (self.field, self.descending) {
            (ProjectSortField::CreatedAt, false) => "created_at ASC, id ASC",
            (ProjectSortField::CreatedAt, true) => "created_at DESC, id DESC",
            (ProjectSortField::Title, false) => "title COLLATE NOCASE ASC, id ASC",
            (ProjectSortField::Title, true) => "title COLLATE NOCASE DESC, id DESC",
        }
    }
}

/// Normalized, already-validated list options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectListQuery {
    /// Case-insensitive substring over title or description.
    pub search: Option<String>,
    /// Inclusive lower bound, epoch ms.
    pub created_from: Option<i64>,
    /// Inclusive upper bound, epoch ms.
    pub created_to: Option<i64>,
    pub order: ProjectOrder,
    /// `None` returns every match.
    pub limit: Option<u32>,
    pub offset: u64,
}

/// Repository interface for project lifecycle and listing.
pub trait ProjectRepository {
    /// Inserts the project and its document with `initial_content` atomically.
    fn create_project_with_document(
        &self,
        owner_id: UserId,
        title: &str,
        description: &str,
        initial_content: &str,
    ) -> RepoResult<(Project, Document)>;
    /// Loads one project by id.
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    /// Applies a validated partial update and returns the new row.
    fn update_project_metadata(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project>;
    /// Hard-deletes the project; FK cascades remove document and history.
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    /// Lists one owner's projects; returns the page and the unpaged total.
    fn list_projects(
        &self,
        owner_id: UserId,
        query: &ProjectListQuery,
    ) -> RepoResult<(Vec<Project>, u64)>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project_with_document(
        &self,
        owner_id: UserId,
        title: &str,
        description: &str,
        initial_content: &str,
    ) -> RepoResult<(Project, Document)> {
        let created_at = now_epoch_ms();
        let project = Project {
            id: Uuid::new_v4(),
            owner_id,
            title: title.to_string(),
            description: description.to_string(),
            created_at,
        };
        let document = Document {
            id: Uuid::new_v4(),
            project_id: project.id,
            content: initial_content.to_string(),
            last_modified: created_at,
        };

        let tx = begin_write(self.conn)?;
        tx.execute(
            "INSERT INTO projects (id, owner_id, title, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.id.to_string(),
                project.owner_id.to_string(),
                project.title.as_str(),
                project.description.as_str(),
                project.created_at,
            ],
        )
        .map_err(|err| map_missing_owner(err, owner_id))?;
        tx.execute(
            "INSERT INTO documents (id, project_id, content, last_modified)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                document.id.to_string(),
                document.project_id.to_string(),
                document.content.as_str(),
                document.last_modified,
            ],
        )?;
        tx.commit()?;

        Ok((project, document))
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        find_project(self.conn, id)
    }

    fn update_project_metadata(&self, id: ProjectId, patch: &ProjectPatch) -> RepoResult<Project> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                title = COALESCE(?2, title),
                description = COALESCE(?3, description)
             WHERE id = ?1;",
            params![
                id.to_string(),
                patch.title.as_deref(),
                patch.description.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Project, id));
        }

        self.get_project(id)?
            .ok_or_else(|| RepoError::not_found(EntityKind::Project, id))
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        let changed = tx.execute("DELETE FROM projects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Project, id));
        }
        tx.commit()?;
        Ok(())
    }

    fn list_projects(
        &self,
        owner_id: UserId,
        query: &ProjectListQuery,
    ) -> RepoResult<(Vec<Project>, u64)> {
        let mut filter_sql = String::from(" WHERE owner_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(owner_id.to_string())];

        if let Some(search) = query.search.as_ref() {
            filter_sql.push_str(" AND (folio_contains(title, ?) OR folio_contains(description, ?))");
            bind_values.push(Value::Text(search.clone()));
            bind_values.push(Value::Text(search.clone()));
        }
        if let Some(from) = query.created_from {
            filter_sql.push_str(" AND created_at >= ?");
            bind_values.push(Value::Integer(from));
        }
        if let Some(to) = query.created_to {
            filter_sql.push_str(" AND created_at <= ?");
            bind_values.push(Value::Integer(to));
        }

        let total: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM projects{filter_sql};"),
            params_from_iter(bind_values.iter()),
            |row| row.get(0),
        )?;

        let mut sql = format!("{PROJECT_SELECT_SQL}{filter_sql}");
        sql.push_str(" ORDER BY ");
        sql.push_str(query.order.to_sql());
        sql.push_str(" LIMIT ? OFFSET ?");
        // SQLite treats a negative LIMIT as unbounded.
        bind_values.push(Value::Integer(query.limit.map_or(-1, i64::from)));
        bind_values.push(Value::Integer(
            i64::try_from(query.offset).unwrap_or(i64::MAX),
        ));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok((projects, count_to_u64(total, "projects")?))
    }
}

fn find_project(conn: &Connection, id: ProjectId) -> RepoResult<Option<Project>> {
    conn.query_row(
        &format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"),
        [id.to_string()],
        |row| Ok(parse_project_row(row)),
    )
    .optional()?
    .transpose()
}

pub(crate) fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    Ok(Project {
        id: parse_uuid(&id_text, "projects.id")?,
        owner_id: parse_uuid(&owner_text, "projects.owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
    })
}

fn map_missing_owner(err: rusqlite::Error, owner_id: UserId) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return RepoError::not_found(EntityKind::User, owner_id);
        }
    }
    err.into()
}
