use folio_core::{
    document_locks, open_db_in_memory, CoreConfig, FolioApi, Identity, ProjectFilter, ProjectId,
};
use rusqlite::{params, Connection};

const JAN_01_10AM: i64 = 1_704_103_200_000;
const JAN_02_LAST_MS: i64 = 1_704_239_999_999;
const JAN_03_START: i64 = 1_704_240_000_000;

#[test]
fn date_window_is_inclusive_through_end_of_day() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let [first, second, third] = seed(&api, &conn, &owner);

    let page = api
        .list_projects(
            &owner,
            &ProjectFilter {
                date_from: Some("2024-01-02".to_string()),
                date_to: Some("2024-01-02".to_string()),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&page.items), vec![second]);

    let from_rfc3339 = api
        .list_projects(
            &owner,
            &ProjectFilter {
                date_from: Some("2024-01-01T12:00:00Z".to_string()),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&from_rfc3339.items), vec![third, second]);
    assert!(!ids(&from_rfc3339.items).contains(&first));
}

#[test]
fn future_lower_bound_returns_empty_page() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    seed(&api, &conn, &owner);

    let page = api
        .list_projects(
            &owner,
            &ProjectFilter {
                date_from: Some("2999-01-01".to_string()),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[test]
fn malformed_filters_are_ignored() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let [first, second, third] = seed(&api, &conn, &owner);

    let page = api
        .list_projects(
            &owner,
            &ProjectFilter {
                date_from: Some("yesterday".to_string()),
                date_to: Some("2024-13-45".to_string()),
                order_by: Some("popularity".to_string()),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(ids(&page.items), vec![third, second, first]);
}

#[test]
fn ordering_and_pagination() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let [first, second, third] = seed(&api, &conn, &owner);

    let by_title = api
        .list_projects(
            &owner,
            &ProjectFilter {
                order_by: Some("title".to_string()),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    let titles = by_title
        .items
        .iter()
        .map(|project| project.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["alpine log", "Bird Survey", "Field Notes"]);

    let oldest_first = api
        .list_projects(
            &owner,
            &ProjectFilter {
                order_by: Some("createdAt".to_string()),
                page: Some(2),
                page_size: Some(2),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    assert_eq!(oldest_first.total, 3);
    assert_eq!(oldest_first.page, 2);
    assert_eq!(oldest_first.page_size, 2);
    assert_eq!(ids(&oldest_first.items), vec![third]);

    let newest_first = api
        .list_projects(
            &owner,
            &ProjectFilter {
                order_by: Some("-created_at".to_string()),
                page_size: Some(500),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    assert_eq!(newest_first.page_size, 100);
    assert_eq!(ids(&newest_first.items), vec![third, second, first]);
}

#[test]
fn search_ignores_case_across_titles_descriptions_and_content() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let [first, second, third] = seed(&api, &conn, &owner);
    api.update_document(&owner, third, "Über den Fluss\n\nand a FIELD trip")
        .unwrap();

    let page = api
        .list_projects(
            &owner,
            &ProjectFilter {
                search: Some("  FIELD ".to_string()),
                ..ProjectFilter::default()
            },
        )
        .unwrap();
    assert_eq!(ids(&page.items), vec![second, first]);

    let results = api.search_projects_and_documents(&owner, "über").unwrap();
    assert!(results.projects.is_empty());
    assert_eq!(results.documents.len(), 1);
    assert_eq!(results.documents[0].project_id, third);
    assert_eq!(results.documents[0].project_title, "alpine log");
    assert_eq!(results.documents[0].preview, "Über den Fluss and a FIELD trip");

    let blank = api.search_projects_and_documents(&owner, "   ").unwrap();
    assert!(blank.projects.is_empty());
    assert!(blank.documents.is_empty());
}

#[test]
fn search_returns_every_match_beyond_the_page_cap() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let match_count = CoreConfig::default().max_page_size as usize + 50;
    for index in 0..match_count {
        let project_id = api
            .create_project(&owner, &format!("Needle {index}"), "")
            .unwrap();
        api.update_document(&owner, project_id, "a NEEDLE in the hay")
            .unwrap();
    }
    api.create_project(&owner, "Haystack", "").unwrap();

    let documents = api.search_documents(&owner, "needle").unwrap();
    assert_eq!(documents.len(), match_count);

    let results = api.search_projects_and_documents(&owner, "needle").unwrap();
    assert_eq!(results.projects.len(), match_count);
    assert_eq!(results.documents.len(), match_count);
    let distinct = results
        .projects
        .iter()
        .map(|project| project.id)
        .collect::<std::collections::HashSet<_>>();
    assert_eq!(distinct.len(), match_count);
}

/// Creates three projects pinned to 2024-01-01, 2024-01-02 and 2024-01-03.
fn seed(api: &FolioApi<'_>, conn: &Connection, owner: &Identity) -> [ProjectId; 3] {
    let first = api
        .create_project(owner, "Field Notes", "spring survey")
        .unwrap();
    let second = api
        .create_project(owner, "Bird Survey", "field counts")
        .unwrap();
    let third = api.create_project(owner, "alpine log", "").unwrap();
    for (id, created_at) in [
        (first, JAN_01_10AM),
        (second, JAN_02_LAST_MS),
        (third, JAN_03_START),
    ] {
        conn.execute(
            "UPDATE projects SET created_at = ?2 WHERE id = ?1;",
            params![id.to_string(), created_at],
        )
        .unwrap();
    }
    [first, second, third]
}

fn ids(projects: &[folio_core::Project]) -> Vec<ProjectId> {
    projects.iter().map(|project| project.id).collect()
}

fn api(conn: &Connection) -> FolioApi<'_> {
    let config = CoreConfig::default();
    FolioApi::new(conn, document_locks(&config), config)
}

fn register(api: &FolioApi<'_>, handle: &str) -> Identity {
    let user = api
        .register_user(&format!("{handle}@example.com"), handle)
        .unwrap();
    Identity::from(&user)
}
