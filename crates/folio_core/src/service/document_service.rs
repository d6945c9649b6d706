//! Document store use-cases.
//!
//! # Responsibility
//! - Guarded reads of current content.
//! - Snapshot-on-write updates: the pre-image is appended to the revision
//!   log only when content really changes.
//!
//! # Invariants
//! - Identical content is a full no-op: no history row, no timestamp change.
//! - Snapshot append and content swap commit together or not at all.
//! - Writes to one document are serialized by its `DocumentLocks` slot.

use crate::access::doc_locks::DocumentLocks;
use crate::access::guard::{OwnedEntity, OwnerLookup, OwnershipGuard};
use crate::error::{CoreError, CoreResult, EntityKind};
use crate::model::document::{Document, DocumentId, DocumentWrite};
use crate::model::identity::Identity;
use crate::model::project::ProjectId;
use crate::repo::document_repo::{ContentWrite, DocumentRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::time::Instant;

pub struct DocumentService<'a, D: DocumentRepository, L: OwnerLookup> {
    repo: D,
    guard: &'a OwnershipGuard<L>,
    locks: &'a DocumentLocks,
    placeholder: &'a str,
}

impl<'a, D: DocumentRepository, L: OwnerLookup> DocumentService<'a, D, L> {
    pub fn new(
        repo: D,
        guard: &'a OwnershipGuard<L>,
        locks: &'a DocumentLocks,
        placeholder: &'a str,
    ) -> Self {
        Self {
            repo,
            guard,
            locks,
            placeholder,
        }
    }

    /// Returns the project's current document.
    pub fn get_document(&self, identity: &Identity, project_id: ProjectId) -> CoreResult<Document> {
        self.guard
            .check(identity, OwnedEntity::Project(project_id))?;
        self.repo
            .get_by_project(project_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Project, project_id))
    }

    /// Returns a document addressed by its own id.
    pub fn get_document_by_id(
        &self,
        identity: &Identity,
        document_id: DocumentId,
    ) -> CoreResult<Document> {
        self.guard
            .check(identity, OwnedEntity::Document(document_id))?;
        self.repo
            .get_document(document_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Document, document_id))
    }

    /// Replaces content, snapshotting the previous content first.
    ///
    /// # Contract
    /// - Equal content returns the current document with
    ///   `history_entry_created = false` and writes nothing.
    /// - Different content appends exactly one history entry holding the
    ///   pre-update content and advances `last_modified`.
    ///
    /// # Errors
    /// - `NotFound` when the project is absent, foreign, or deleted mid-call.
    /// - `Conflict` when the document stays locked past the wait budget.
    pub fn update_document(
        &self,
        identity: &Identity,
        project_id: ProjectId,
        new_content: &str,
    ) -> CoreResult<DocumentWrite> {
        let started_at = Instant::now();
        self.guard
            .check(identity, OwnedEntity::Project(project_id))?;

        let document_id = self.resolve_document_id(project_id)?;
        let _lock = self.locks.acquire(document_id)?;

        let outcome = self
            .repo
            .write_content(document_id, new_content)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => RepoError::not_found(EntityKind::Project, project_id),
                other => other,
            })?;

        let write = match outcome {
            ContentWrite::Unchanged(document) => DocumentWrite {
                document,
                history_entry_created: false,
            },
            ContentWrite::Changed { document, snapshot } => {
                info!(
                    "event=history_append module=history status=ok document_id={} history_id={} snapshot_bytes={}",
                    document_id,
                    snapshot.id,
                    snapshot.content_snapshot.len()
                );
                DocumentWrite {
                    document,
                    history_entry_created: true,
                }
            }
        };

        info!(
            "event=document_update module=document status=ok project_id={} document_id={} changed={} content_bytes={} duration_ms={}",
            project_id,
            document_id,
            write.history_entry_created,
            new_content.len(),
            started_at.elapsed().as_millis()
        );
        Ok(write)
    }

    fn resolve_document_id(&self, project_id: ProjectId) -> CoreResult<DocumentId> {
        if let Some(document) = self.repo.get_by_project(project_id)? {
            return Ok(document.id);
        }
        warn!(
            "event=document_lazy_create module=document status=ok project_id={}",
            project_id
        );
        let document = self.repo.ensure_document(project_id, self.placeholder)?;
        Ok(document.id)
    }
}
