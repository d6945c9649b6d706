//! On-demand rollups over one owner's projects, documents and history.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::model::identity::Identity;
use crate::model::project::Project;
use crate::repo::stats_repo::{RecentRevision, StatsRepository};
use log::debug;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub project_count: u64,
    pub document_count: u64,
    pub history_count: u64,
    /// Whitespace-delimited tokens across all owned document contents.
    pub total_words: u64,
    /// Unicode scalar values across all owned document contents.
    pub total_characters: u64,
    pub recent_projects: Vec<Project>,
    pub recent_history: Vec<RecentRevision>,
}

pub struct AnalyticsService<'a, S: StatsRepository> {
    repo: S,
    config: &'a CoreConfig,
}

impl<'a, S: StatsRepository> AnalyticsService<'a, S> {
    pub fn new(repo: S, config: &'a CoreConfig) -> Self {
        Self { repo, config }
    }

    /// Computes the summary for `identity`; nothing is cached.
    pub fn summary(&self, identity: &Identity) -> CoreResult<AnalyticsSummary> {
        let started_at = Instant::now();
        let owner_id = identity.user_id;
        let totals = self.repo.owner_totals(owner_id)?;
        let content = self.repo.content_stats(owner_id)?;
        let recent_projects = self
            .repo
            .recent_projects(owner_id, self.config.analytics_recent_projects)?;
        let recent_history = self
            .repo
            .recent_history(owner_id, self.config.analytics_recent_history)?;

        debug!(
            "event=analytics_summary module=analytics status=ok projects={} history={} duration_ms={}",
            totals.projects,
            totals.history_entries,
            started_at.elapsed().as_millis()
        );

        Ok(AnalyticsSummary {
            project_count: totals.projects,
            document_count: totals.documents,
            history_count: totals.history_entries,
            total_words: content.words,
            total_characters: content.characters,
            recent_projects,
            recent_history,
        })
    }
}
