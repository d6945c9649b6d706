//! Revision log read use-cases.
//!
//! Appends never go through here; they happen inside the document write
//! transaction. This service only pages through what was recorded.

use crate::access::guard::{OwnedEntity, OwnerLookup, OwnershipGuard};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, EntityKind};
use crate::model::document::{DocumentId, HistoryEntry, HistoryId};
use crate::model::identity::Identity;
use crate::model::page::{Page, PageRequest};
use crate::repo::history_repo::HistoryRepository;

pub struct HistoryService<'a, H: HistoryRepository, L: OwnerLookup> {
    repo: H,
    guard: &'a OwnershipGuard<L>,
    config: &'a CoreConfig,
}

impl<'a, H: HistoryRepository, L: OwnerLookup> HistoryService<'a, H, L> {
    pub fn new(repo: H, guard: &'a OwnershipGuard<L>, config: &'a CoreConfig) -> Self {
        Self {
            repo,
            guard,
            config,
        }
    }

    /// Lists entries newest-first (`created_at DESC, id DESC`).
    pub fn list_history(
        &self,
        identity: &Identity,
        document_id: DocumentId,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> CoreResult<Page<HistoryEntry>> {
        self.guard
            .check(identity, OwnedEntity::Document(document_id))?;
        let request = PageRequest::normalize(
            page,
            page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        let total = self.repo.count_history(document_id)?;
        let items = self
            .repo
            .list_history(document_id, request.limit(), request.offset())?;
        Ok(request.wrap(items, total))
    }

    /// First `limit` entries of [`Self::list_history`].
    ///
    /// `None` or 0 uses the configured recent limit; values above the max page
    /// size are clamped.
    pub fn recent_history(
        &self,
        identity: &Identity,
        document_id: DocumentId,
        limit: Option<u32>,
    ) -> CoreResult<Vec<HistoryEntry>> {
        self.guard
            .check(identity, OwnedEntity::Document(document_id))?;
        let request = PageRequest::normalize(
            Some(1),
            limit,
            self.config.recent_history_limit,
            self.config.max_page_size,
        );
        Ok(self.repo.list_history(document_id, request.limit(), 0)?)
    }

    pub fn get_entry(&self, identity: &Identity, history_id: HistoryId) -> CoreResult<HistoryEntry> {
        self.guard
            .check(identity, OwnedEntity::History(history_id))?;
        self.repo
            .get_entry(history_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::History, history_id))
    }
}
