//! Read-only aggregate queries over one owner's data.
//!
//! Every query joins back to `projects.owner_id`; nothing here is cached.

use crate::model::document::{ContentStats, HistoryEntry};
use crate::model::project::{Project, ProjectId};
use crate::model::user::UserId;
use crate::repo::history_repo::parse_history_row;
use crate::repo::project_repo::parse_project_row;
use crate::repo::{count_to_u64, parse_uuid, RepoResult};
use rusqlite::{params, Connection};
use serde::Serialize;

/// Row counts owned by one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OwnerTotals {
    pub projects: u64,
    pub documents: u64,
    pub history_entries: u64,
}

/// History entry joined with its project for cross-document feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentRevision {
    pub entry: HistoryEntry,
    pub project_id: ProjectId,
    pub project_title: String,
}

/// Repository interface for owner-scoped rollups.
pub trait StatsRepository {
    fn owner_totals(&self, owner_id: UserId) -> RepoResult<OwnerTotals>;
    /// Sums word and character counts across all owned document contents.
    fn content_stats(&self, owner_id: UserId) -> RepoResult<ContentStats>;
    /// Newest projects by creation time.
    fn recent_projects(&self, owner_id: UserId, limit: u32) -> RepoResult<Vec<Project>>;
    /// Newest history entries across all owned documents.
    fn recent_history(&self, owner_id: UserId, limit: u32) -> RepoResult<Vec<RecentRevision>>;
}

pub struct SqliteStatsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStatsRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl StatsRepository for SqliteStatsRepository<'_> {
    fn owner_totals(&self, owner_id: UserId) -> RepoResult<OwnerTotals> {
        let (projects, documents, history_entries): (i64, i64, i64) = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM projects WHERE owner_id = ?1),
                (SELECT COUNT(*)
                   FROM documents d
                   INNER JOIN projects p ON p.id = d.project_id
                  WHERE p.owner_id = ?1),
                (SELECT COUNT(*)
                   FROM history h
                   INNER JOIN documents d ON d.id = h.document_id
                   INNER JOIN projects p ON p.id = d.project_id
                  WHERE p.owner_id = ?1);",
            [owner_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(OwnerTotals {
            projects: count_to_u64(projects, "projects")?,
            documents: count_to_u64(documents, "documents")?,
            history_entries: count_to_u64(history_entries, "history")?,
        })
    }

    fn content_stats(&self, owner_id: UserId) -> RepoResult<ContentStats> {
        let mut stmt = self.conn.prepare(
            "SELECT d.content
             FROM documents d
             INNER JOIN projects p ON p.id = d.project_id
             WHERE p.owner_id = ?1;",
        )?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut totals = ContentStats::default();
        while let Some(row) = rows.next()? {
            let content: String = row.get(0)?;
            totals = totals.add(ContentStats::of(&content));
        }
        Ok(totals)
    }

    fn recent_projects(&self, owner_id: UserId, limit: u32) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner_id, title, description, created_at
             FROM projects
             WHERE owner_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![owner_id.to_string(), i64::from(limit)])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn recent_history(&self, owner_id: UserId, limit: u32) -> RepoResult<Vec<RecentRevision>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                h.id AS id,
                h.document_id AS document_id,
                h.content_snapshot AS content_snapshot,
                h.created_at AS created_at,
                p.id AS project_id,
                p.title AS project_title
             FROM history h
             INNER JOIN documents d ON d.id = h.document_id
             INNER JOIN projects p ON p.id = d.project_id
             WHERE p.owner_id = ?1
             ORDER BY h.created_at DESC, h.id DESC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![owner_id.to_string(), i64::from(limit)])?;
        let mut revisions = Vec::new();
        while let Some(row) = rows.next()? {
            let project_text: String = row.get("project_id")?;
            revisions.push(RecentRevision {
                entry: parse_history_row(row)?,
                project_id: parse_uuid(&project_text, "projects.id")?,
                project_title: row.get("project_title")?,
            });
        }
        Ok(revisions)
    }
}
