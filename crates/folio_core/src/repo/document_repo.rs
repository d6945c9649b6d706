//! Document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read current document content by project or document id.
//! - Apply content writes together with their pre-image snapshot.
//! - Owner-scoped substring search over content.
//!
//! # Invariants
//! - `write_content` reads the current content inside the same `IMMEDIATE`
//!   transaction that appends the snapshot and swaps the content.
//! - Equal content leaves every row untouched.
//! - `last_modified` strictly increases on every real change.

use crate::error::EntityKind;
use crate::model::document::{Document, DocumentId, HistoryEntry};
use crate::model::now_epoch_ms;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::history_repo::{HistoryRepository, SqliteHistoryRepository};
use crate::repo::{begin_write, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT id, project_id, content, last_modified FROM documents";
const PREVIEW_MAX_CHARS: usize = 100;

/// Result of a conditional content write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentWrite {
    /// New content matched current content; nothing was written.
    Unchanged(Document),
    /// Content replaced; `snapshot` holds the pre-update content.
    Changed {
        document: Document,
        snapshot: HistoryEntry,
    },
}

/// Search read model for one matching document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMatch {
    pub document_id: DocumentId,
    pub project_id: ProjectId,
    pub project_title: String,
    /// First characters of content with whitespace collapsed.
    pub preview: String,
    pub last_modified: i64,
}

/// Repository interface for document content.
pub trait DocumentRepository {
    /// Loads the document that belongs to `project_id`.
    fn get_by_project(&self, project_id: ProjectId) -> RepoResult<Option<Document>>;
    /// Loads one document by id.
    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>>;
    /// Inserts a document for a project that lacks one, or returns the
    /// existing one untouched.
    fn ensure_document(&self, project_id: ProjectId, placeholder: &str) -> RepoResult<Document>;
    /// Compares and, if different, snapshots then replaces content atomically.
    fn write_content(&self, id: DocumentId, new_content: &str) -> RepoResult<ContentWrite>;
    /// Owner-scoped case-insensitive substring search over content; every
    /// match is returned.
    fn search_content(&self, owner_id: UserId, needle: &str) -> RepoResult<Vec<DocumentMatch>>;
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn get_by_project(&self, project_id: ProjectId) -> RepoResult<Option<Document>> {
        find_document(self.conn, "project_id", &project_id.to_string())
    }

    fn get_document(&self, id: DocumentId) -> RepoResult<Option<Document>> {
        find_document(self.conn, "id", &id.to_string())
    }

    fn ensure_document(&self, project_id: ProjectId, placeholder: &str) -> RepoResult<Document> {
        let tx = begin_write(self.conn)?;
        tx.execute(
            "INSERT OR IGNORE INTO documents (id, project_id, content, last_modified)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                Uuid::new_v4().to_string(),
                project_id.to_string(),
                placeholder,
                now_epoch_ms(),
            ],
        )
        .map_err(|err| {
            // The project vanished between the caller's check and this insert.
            if let rusqlite::Error::SqliteFailure(failure, _) = &err {
                if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    return RepoError::not_found(EntityKind::Project, project_id);
                }
            }
            RepoError::from(err)
        })?;
        let document = find_document(&tx, "project_id", &project_id.to_string())?
            .ok_or_else(|| RepoError::not_found(EntityKind::Project, project_id))?;
        tx.commit()?;
        Ok(document)
    }

    fn write_content(&self, id: DocumentId, new_content: &str) -> RepoResult<ContentWrite> {
        let tx = begin_write(self.conn)?;
        let current = find_document(&tx, "id", &id.to_string())?
            .ok_or_else(|| RepoError::not_found(EntityKind::Document, id))?;

        if current.content.as_bytes() == new_content.as_bytes() {
            // Dropping the transaction rolls back; nothing was written anyway.
            return Ok(ContentWrite::Unchanged(current));
        }

        let snapshot = SqliteHistoryRepository::new(&tx).append(id, &current.content)?;
        let last_modified = now_epoch_ms().max(current.last_modified + 1);
        tx.execute(
            "UPDATE documents SET content = ?2, last_modified = ?3 WHERE id = ?1;",
            params![id.to_string(), new_content, last_modified],
        )?;
        tx.commit()?;

        Ok(ContentWrite::Changed {
            document: Document {
                content: new_content.to_string(),
                last_modified,
                ..current
            },
            snapshot,
        })
    }

    fn search_content(&self, owner_id: UserId, needle: &str) -> RepoResult<Vec<DocumentMatch>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                d.id AS id,
                d.project_id AS project_id,
                d.content AS content,
                d.last_modified AS last_modified,
                p.title AS title
             FROM documents d
             INNER JOIN projects p ON p.id = d.project_id
             WHERE p.owner_id = ?1
               AND folio_contains(d.content, ?2)
             ORDER BY d.last_modified DESC, d.id ASC;",
        )?;
        let mut rows = stmt.query(params![owner_id.to_string(), needle])?;

        let mut matches = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            let project_text: String = row.get("project_id")?;
            let content: String = row.get("content")?;
            matches.push(DocumentMatch {
                document_id: parse_uuid(&id_text, "documents.id")?,
                project_id: parse_uuid(&project_text, "documents.project_id")?,
                project_title: row.get("title")?,
                preview: content_preview(&content),
                last_modified: row.get("last_modified")?,
            });
        }
        Ok(matches)
    }
}

fn find_document(conn: &Connection, column: &str, value: &str) -> RepoResult<Option<Document>> {
    conn.query_row(
        &format!("{DOCUMENT_SELECT_SQL} WHERE {column} = ?1;"),
        [value],
        |row| Ok(parse_document_row(row)),
    )
    .optional()?
    .transpose()
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<Document> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    Ok(Document {
        id: parse_uuid(&id_text, "documents.id")?,
        project_id: parse_uuid(&project_text, "documents.project_id")?,
        content: row.get("content")?,
        last_modified: row.get("last_modified")?,
    })
}

/// Collapses whitespace and keeps the first 100 chars.
pub fn content_preview(content: &str) -> String {
    content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_MAX_CHARS)
        .collect()
}
