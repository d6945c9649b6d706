//! Project directory use-cases.
//!
//! # Responsibility
//! - Create projects together with their document.
//! - Partial metadata updates with the same rules as creation.
//! - Cascading delete serialized against in-flight document writes.
//!
//! # Invariants
//! - A project is never visible without its document.
//! - Delete holds the document's lock, so it cannot interleave with the
//!   read-compare-append-swap of an update.

use crate::access::doc_locks::DocumentLocks;
use crate::access::guard::{OwnedEntity, OwnerLookup, OwnershipGuard};
use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::model::document::DocumentId;
use crate::model::identity::Identity;
use crate::model::project::{validate_title, Project, ProjectId, ProjectPatch};
use crate::repo::document_repo::DocumentRepository;
use crate::repo::project_repo::ProjectRepository;
use log::info;
use serde::Serialize;

/// Acknowledgement returned by a successful delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteConfirmation {
    pub project_id: ProjectId,
    pub document_id: Option<DocumentId>,
}

pub struct ProjectService<'a, P, D, L>
where
    P: ProjectRepository,
    D: DocumentRepository,
    L: OwnerLookup,
{
    projects: P,
    documents: D,
    guard: &'a OwnershipGuard<L>,
    locks: &'a DocumentLocks,
    placeholder: &'a str,
}

impl<'a, P, D, L> ProjectService<'a, P, D, L>
where
    P: ProjectRepository,
    D: DocumentRepository,
    L: OwnerLookup,
{
    pub fn new(
        projects: P,
        documents: D,
        guard: &'a OwnershipGuard<L>,
        locks: &'a DocumentLocks,
        placeholder: &'a str,
    ) -> Self {
        Self {
            projects,
            documents,
            guard,
            locks,
            placeholder,
        }
    }

    /// Creates a project and its placeholder document in one transaction.
    pub fn create_project(
        &self,
        identity: &Identity,
        title: &str,
        description: &str,
    ) -> CoreResult<Project> {
        let title = validate_title(title).map_err(|field| ValidationError {
            fields: vec![field],
        })?;
        let (project, document) = self.projects.create_project_with_document(
            identity.user_id,
            &title,
            description,
            self.placeholder,
        )?;
        info!(
            "event=project_create module=project status=ok project_id={} document_id={}",
            project.id, document.id
        );
        Ok(project)
    }

    pub fn get_project(&self, identity: &Identity, project_id: ProjectId) -> CoreResult<Project> {
        self.guard
            .check(identity, OwnedEntity::Project(project_id))?;
        self.projects
            .get_project(project_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Project, project_id))
    }

    /// Applies a partial update; an empty patch returns the project unchanged.
    pub fn update_project_metadata(
        &self,
        identity: &Identity,
        project_id: ProjectId,
        patch: ProjectPatch,
    ) -> CoreResult<Project> {
        let patch = patch.validated()?;
        self.guard
            .check(identity, OwnedEntity::Project(project_id))?;
        if patch.is_empty() {
            return self.get_project(identity, project_id);
        }
        let project = self.projects.update_project_metadata(project_id, &patch)?;
        info!(
            "event=project_update module=project status=ok project_id={} title_changed={} description_changed={}",
            project_id,
            patch.title.is_some(),
            patch.description.is_some()
        );
        Ok(project)
    }

    /// Deletes the project; its document and history go with it.
    pub fn delete_project(
        &self,
        identity: &Identity,
        project_id: ProjectId,
    ) -> CoreResult<DeleteConfirmation> {
        self.guard
            .check(identity, OwnedEntity::Project(project_id))?;

        let document_id = self
            .documents
            .get_by_project(project_id)?
            .map(|document| document.id);
        let _lock = match document_id {
            Some(document_id) => Some(self.locks.acquire(document_id)?),
            None => None,
        };

        self.projects.delete_project(project_id)?;
        info!(
            "event=project_delete module=project status=ok project_id={} document_id={}",
            project_id,
            document_id.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(DeleteConfirmation {
            project_id,
            document_id,
        })
    }
}
