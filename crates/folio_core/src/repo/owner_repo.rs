//! Transitive owner resolution backing the ownership guard.

use crate::access::guard::{OwnedEntity, OwnerLookup};
use crate::model::user::UserId;
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{Connection, OptionalExtension, ToSql};

/// Resolves owners with one indexed join per entity kind.
pub struct SqliteOwnerLookup<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOwnerLookup<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_owner(&self, sql: &str, key: &dyn ToSql) -> RepoResult<Option<UserId>> {
        let owner: Option<String> = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        owner
            .map(|value| parse_uuid(&value, "projects.owner_id"))
            .transpose()
    }
}

impl OwnerLookup for SqliteOwnerLookup<'_> {
    fn owner_of(&self, entity: OwnedEntity) -> RepoResult<Option<UserId>> {
        match entity {
            OwnedEntity::Project(id) => self.query_owner(
                "SELECT owner_id FROM projects WHERE id = ?1;",
                &id.to_string(),
            ),
            OwnedEntity::Document(id) => self.query_owner(
                "SELECT p.owner_id
                 FROM documents d
                 INNER JOIN projects p ON p.id = d.project_id
                 WHERE d.id = ?1;",
                &id.to_string(),
            ),
            OwnedEntity::History(id) => self.query_owner(
                "SELECT p.owner_id
                 FROM history h
                 INNER JOIN documents d ON d.id = h.document_id
                 INNER JOIN projects p ON p.id = d.project_id
                 WHERE h.id = ?1;",
                &id,
            ),
        }
    }
}
