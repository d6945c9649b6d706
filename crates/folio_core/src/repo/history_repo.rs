//! Revision log repository: append-only full-content snapshots.
//!
//! # Responsibility
//! - Append snapshots with server-assigned id and timestamp.
//! - Page through one document's entries newest-first.
//!
//! # Invariants
//! - `append` is the only mutation; a schema trigger rejects UPDATEs.
//! - Listing order is `created_at DESC, id DESC`; `created_at` never
//!   decreases within a document, so that order matches insertion order.
//! - Rows disappear only through the document's FK cascade.

use crate::model::document::{DocumentId, HistoryEntry, HistoryId};
use crate::model::now_epoch_ms;
use crate::repo::{count_to_u64, parse_uuid, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const HISTORY_ORDER_SQL: &str = "created_at DESC, id DESC";

/// Repository interface for the revision log.
pub trait HistoryRepository {
    /// Appends one snapshot and returns the stored entry.
    fn append(&self, document_id: DocumentId, snapshot: &str) -> RepoResult<HistoryEntry>;
    /// Lists one document's entries newest-first.
    fn list_history(
        &self,
        document_id: DocumentId,
        limit: u32,
        offset: u64,
    ) -> RepoResult<Vec<HistoryEntry>>;
    /// Counts one document's entries.
    fn count_history(&self, document_id: DocumentId) -> RepoResult<u64>;
    /// Loads one entry by id.
    fn get_entry(&self, id: HistoryId) -> RepoResult<Option<HistoryEntry>>;
}

/// SQLite-backed revision log.
///
/// Construct it over a `Transaction` (which derefs to `Connection`) to make
/// the append part of a larger write.
pub struct SqliteHistoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHistoryRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl HistoryRepository for SqliteHistoryRepository<'_> {
    fn append(&self, document_id: DocumentId, snapshot: &str) -> RepoResult<HistoryEntry> {
        // Never stamp below the newest entry, even if the wall clock stepped back.
        let latest: Option<i64> = self.conn.query_row(
            "SELECT MAX(created_at) FROM history WHERE document_id = ?1;",
            [document_id.to_string()],
            |row| row.get(0),
        )?;
        let created_at = latest.map_or_else(now_epoch_ms, |latest| now_epoch_ms().max(latest));
        self.conn.execute(
            "INSERT INTO history (document_id, content_snapshot, created_at)
             VALUES (?1, ?2, ?3);",
            params![document_id.to_string(), snapshot, created_at],
        )?;

        Ok(HistoryEntry {
            id: self.conn.last_insert_rowid(),
            document_id,
            content_snapshot: snapshot.to_string(),
            created_at,
        })
    }

    fn list_history(
        &self,
        document_id: DocumentId,
        limit: u32,
        offset: u64,
    ) -> RepoResult<Vec<HistoryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, document_id, content_snapshot, created_at
             FROM history
             WHERE document_id = ?1
             ORDER BY {HISTORY_ORDER_SQL}
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let mut rows = stmt.query(params![
            document_id.to_string(),
            i64::from(limit),
            i64::try_from(offset).unwrap_or(i64::MAX),
        ])?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_history_row(row)?);
        }
        Ok(entries)
    }

    fn count_history(&self, document_id: DocumentId) -> RepoResult<u64> {
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM history WHERE document_id = ?1;",
            [document_id.to_string()],
            |row| row.get(0),
        )?;
        count_to_u64(total, "history")
    }

    fn get_entry(&self, id: HistoryId) -> RepoResult<Option<HistoryEntry>> {
        self.conn
            .query_row(
                "SELECT id, document_id, content_snapshot, created_at
                 FROM history
                 WHERE id = ?1;",
                [id],
                |row| Ok(parse_history_row(row)),
            )
            .optional()?
            .transpose()
    }
}

pub(crate) fn parse_history_row(row: &Row<'_>) -> RepoResult<HistoryEntry> {
    let document_text: String = row.get("document_id")?;
    Ok(HistoryEntry {
        id: row.get("id")?,
        document_id: parse_uuid(&document_text, "history.document_id")?,
        content_snapshot: row.get("content_snapshot")?,
        created_at: row.get("created_at")?,
    })
}
