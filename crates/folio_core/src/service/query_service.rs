//! Query layer: filtered project listing and substring search.
//!
//! # Responsibility
//! - Turn loosely-typed caller filters into a normalized list query.
//! - Keep every result scoped to the acting identity.
//!
//! # Invariants
//! - Malformed dates, unknown sort keys and blank search text are ignored,
//!   never reported as errors.
//! - Matching is plain case-insensitive containment; there is no ranking.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::model::identity::Identity;
use crate::model::page::{Page, PageRequest};
use crate::model::project::Project;
use crate::repo::document_repo::{DocumentMatch, DocumentRepository};
use crate::repo::project_repo::{
    ProjectListQuery, ProjectOrder, ProjectRepository, ProjectSortField,
};
use chrono::{DateTime, NaiveDate};
use log::debug;
use serde::Serialize;

/// Raw listing filters as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Substring over title or description.
    pub search: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339; inclusive.
    pub date_from: Option<String>,
    /// `YYYY-MM-DD` (through end of day) or RFC 3339; inclusive.
    pub date_to: Option<String>,
    /// `created_at`, `createdAt` or `title`; `-` prefix for descending.
    pub order_by: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Combined project and document search hits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub projects: Vec<Project>,
    pub documents: Vec<DocumentMatch>,
}

#[derive(Debug, Clone, Copy)]
enum DateBound {
    Start,
    End,
}

pub struct QueryService<'a, P: ProjectRepository, D: DocumentRepository> {
    projects: P,
    documents: D,
    config: &'a CoreConfig,
}

impl<'a, P: ProjectRepository, D: DocumentRepository> QueryService<'a, P, D> {
    pub fn new(projects: P, documents: D, config: &'a CoreConfig) -> Self {
        Self {
            projects,
            documents,
            config,
        }
    }

    /// Lists the identity's projects with lenient filter handling.
    pub fn list_projects(
        &self,
        identity: &Identity,
        filter: &ProjectFilter,
    ) -> CoreResult<Page<Project>> {
        let request = PageRequest::normalize(
            filter.page,
            filter.page_size,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        let query = ProjectListQuery {
            search: normalize_search(filter.search.as_deref()),
            created_from: filter
                .date_from
                .as_deref()
                .and_then(|raw| parse_date_bound(raw, DateBound::Start)),
            created_to: filter
                .date_to
                .as_deref()
                .and_then(|raw| parse_date_bound(raw, DateBound::End)),
            order: parse_order(filter.order_by.as_deref()),
            limit: Some(request.limit()),
            offset: request.offset(),
        };

        let (items, total) = self.projects.list_projects(identity.user_id, &query)?;
        Ok(request.wrap(items, total))
    }

    /// Case-insensitive containment over the identity's document contents.
    ///
    /// Blank needles return no hits.
    pub fn search_documents(
        &self,
        identity: &Identity,
        needle: &str,
    ) -> CoreResult<Vec<DocumentMatch>> {
        let Some(needle) = normalize_search(Some(needle)) else {
            return Ok(Vec::new());
        };
        Ok(self
            .documents
            .search_content(identity.user_id, &needle)?)
    }

    /// Searches project metadata and document content with one query string.
    ///
    /// Both lists hold every match, newest first.
    pub fn search_projects_and_documents(
        &self,
        identity: &Identity,
        query: &str,
    ) -> CoreResult<SearchResults> {
        let Some(needle) = normalize_search(Some(query)) else {
            return Ok(SearchResults {
                projects: Vec::new(),
                documents: Vec::new(),
            });
        };

        let query = ProjectListQuery {
            search: Some(needle.clone()),
            limit: None,
            ..ProjectListQuery::default()
        };
        let (projects, _) = self.projects.list_projects(identity.user_id, &query)?;
        let documents = self.search_documents(identity, &needle)?;
        Ok(SearchResults {
            projects,
            documents,
        })
    }
}

fn normalize_search(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_date_bound(raw: &str, bound: DateBound) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let start = date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis();
        return match bound {
            DateBound::Start => Some(start),
            DateBound::End => {
                let next = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
                Some(next.and_utc().timestamp_millis() - 1)
            }
        };
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.timestamp_millis());
    }

    debug!(
        "event=project_list module=query status=ok ignored_filter=date value_len={}",
        trimmed.len()
    );
    None
}

fn parse_order(raw: Option<&str>) -> ProjectOrder {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return ProjectOrder::default();
    };
    let (descending, key) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let field = match key {
        "created_at" | "createdAt" => ProjectSortField::CreatedAt,
        "title" => ProjectSortField::Title,
        _ => {
            debug!("event=project_list module=query status=ok ignored_filter=order_by");
            return ProjectOrder::default();
        }
    };
    ProjectOrder { field, descending }
}

#[cfg(test)]
mod tests {
    use super::{normalize_search, parse_date_bound, parse_order, DateBound};
    use crate::repo::project_repo::{ProjectOrder, ProjectSortField};

    #[test]
    fn date_only_bounds_cover_whole_day() {
        let start = parse_date_bound("2024-03-01", DateBound::Start).expect("start");
        let end = parse_date_bound("2024-03-01", DateBound::End).expect("end");
        assert_eq!(start, 1_709_251_200_000);
        assert_eq!(end - start, 86_400_000 - 1);
    }

    #[test]
    fn rfc3339_bounds_are_exact() {
        let at = parse_date_bound("2024-03-01T12:00:00+02:00", DateBound::Start).expect("rfc3339");
        assert_eq!(at, 1_709_287_200_000);
    }

    #[test]
    fn malformed_dates_are_ignored() {
        assert_eq!(parse_date_bound("yesterday", DateBound::Start), None);
        assert_eq!(parse_date_bound("2024-13-45", DateBound::End), None);
        assert_eq!(parse_date_bound("   ", DateBound::End), None);
    }

    #[test]
    fn order_parsing_accepts_known_keys_and_falls_back() {
        assert_eq!(
            parse_order(Some("title")),
            ProjectOrder {
                field: ProjectSortField::Title,
                descending: false
            }
        );
        assert_eq!(
            parse_order(Some("-createdAt")),
            ProjectOrder {
                field: ProjectSortField::CreatedAt,
                descending: true
            }
        );
        assert_eq!(parse_order(Some("priority")), ProjectOrder::default());
        assert_eq!(parse_order(None), ProjectOrder::default());
    }

    #[test]
    fn blank_search_is_dropped() {
        assert_eq!(normalize_search(Some("  ")), None);
        assert_eq!(normalize_search(Some(" Draft ")), Some("Draft".to_string()));
    }
}
