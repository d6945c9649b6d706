//! Ownership guard shared by every accessor.
//!
//! # Responsibility
//! - Resolve the transitive project owner of an entity
//!   (Project.owner, Document→Project.owner, History→Document→Project.owner).
//! - Reject mismatches with the same `NotFound` used for missing rows.

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::model::document::{DocumentId, HistoryId};
use crate::model::identity::Identity;
use crate::model::project::ProjectId;
use crate::model::user::UserId;
use crate::repo::RepoResult;
use log::debug;

/// Entity whose access is checked against its transitive owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedEntity {
    Project(ProjectId),
    Document(DocumentId),
    History(HistoryId),
}

impl OwnedEntity {
    pub fn kind(self) -> EntityKind {
        match self {
            Self::Project(_) => EntityKind::Project,
            Self::Document(_) => EntityKind::Document,
            Self::History(_) => EntityKind::History,
        }
    }

    fn id_text(self) -> String {
        match self {
            Self::Project(id) => id.to_string(),
            Self::Document(id) => id.to_string(),
            Self::History(id) => id.to_string(),
        }
    }
}

/// Resolves the owning user of an entity, `None` when the entity is absent.
pub trait OwnerLookup {
    fn owner_of(&self, entity: OwnedEntity) -> RepoResult<Option<UserId>>;
}

impl<L: OwnerLookup + ?Sized> OwnerLookup for &L {
    fn owner_of(&self, entity: OwnedEntity) -> RepoResult<Option<UserId>> {
        (**self).owner_of(entity)
    }
}

pub struct OwnershipGuard<L: OwnerLookup> {
    lookup: L,
}

impl<L: OwnerLookup> OwnershipGuard<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Passes only when `identity` owns `entity`.
    ///
    /// # Errors
    /// - `CoreError::NotFound` for both missing entities and foreign owners.
    /// - `CoreError::Internal` when the lookup itself fails.
    pub fn check(&self, identity: &Identity, entity: OwnedEntity) -> CoreResult<()> {
        match self.lookup.owner_of(entity)? {
            Some(owner) if owner == identity.user_id => Ok(()),
            resolved => {
                debug!(
                    "event=ownership_check module=access status=denied entity={} id={} reason={}",
                    entity.kind().as_str(),
                    entity.id_text(),
                    if resolved.is_some() { "foreign_owner" } else { "missing" }
                );
                Err(CoreError::not_found(entity.kind(), entity.id_text()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OwnedEntity, OwnerLookup, OwnershipGuard};
    use crate::error::CoreError;
    use crate::model::identity::Identity;
    use crate::model::user::UserId;
    use crate::repo::RepoResult;
    use uuid::Uuid;

    struct FixedOwner(Option<UserId>);

    impl OwnerLookup for FixedOwner {
        fn owner_of(&self, _entity: OwnedEntity) -> RepoResult<Option<UserId>> {
            Ok(self.0)
        }
    }

    #[test]
    fn owner_passes() {
        let owner = Uuid::new_v4();
        let guard = OwnershipGuard::new(FixedOwner(Some(owner)));
        let identity = Identity::new(owner, "a@example.com");
        assert!(guard
            .check(&identity, OwnedEntity::History(7))
            .is_ok());
    }

    #[test]
    fn foreign_and_missing_look_identical() {
        let identity = Identity::new(Uuid::new_v4(), "a@example.com");
        let project_id = Uuid::new_v4();

        let foreign = OwnershipGuard::new(FixedOwner(Some(Uuid::new_v4())))
            .check(&identity, OwnedEntity::Project(project_id))
            .expect_err("foreign owner");
        let missing = OwnershipGuard::new(FixedOwner(None))
            .check(&identity, OwnedEntity::Project(project_id))
            .expect_err("missing");

        assert_eq!(foreign.to_string(), missing.to_string());
        assert!(matches!(foreign, CoreError::NotFound { .. }));
    }
}
