use folio_core::{
    document_locks, open_db_in_memory, CoreConfig, CoreError, FolioApi, Identity, ProjectFilter,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn foreign_project_looks_exactly_like_a_missing_one() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let alice = register(&api, "alice");
    let mallory = register(&api, "mallory");
    let project_id = api.create_project(&alice, "Private Diary", "").unwrap();

    let foreign = api.get_project(&mallory, project_id).unwrap_err();
    let missing_id = Uuid::new_v4();
    let missing = api.get_project(&mallory, missing_id).unwrap_err();

    match (foreign, missing) {
        (
            CoreError::NotFound { kind: foreign_kind, id: foreign_id },
            CoreError::NotFound { kind: missing_kind, id: missing_id_text },
        ) => {
            assert_eq!(foreign_kind, missing_kind);
            assert_eq!(foreign_id, project_id.to_string());
            assert_eq!(missing_id_text, missing_id.to_string());
        }
        other => panic!("unexpected errors: {other:?}"),
    }
}

#[test]
fn foreign_caller_cannot_touch_any_owned_entity() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let alice = register(&api, "alice");
    let mallory = register(&api, "mallory");
    let project_id = api.create_project(&alice, "Private Diary", "mine").unwrap();
    api.update_document(&alice, project_id, "secret").unwrap();
    let document = api.get_document(&alice, project_id).unwrap();
    let entry = api.recent_history(&alice, document.id, None).unwrap()[0].clone();

    assert_not_found(api.get_document(&mallory, project_id));
    assert_not_found(api.get_document_by_id(&mallory, document.id));
    assert_not_found(api.update_document(&mallory, project_id, "defaced"));
    assert_not_found(api.update_project_metadata(
        &mallory,
        project_id,
        Some("Defaced".to_string()),
        None,
    ));
    assert_not_found(api.list_history(&mallory, document.id, None, None));
    assert_not_found(api.recent_history(&mallory, document.id, None));
    assert_not_found(api.get_history_entry(&mallory, entry.id));
    assert_not_found(api.delete_project(&mallory, project_id));

    let stored = api.get_document(&alice, project_id).unwrap();
    assert_eq!(stored.content, "secret");
    assert_eq!(api.get_project(&alice, project_id).unwrap().title, "Private Diary");
}

#[test]
fn listings_and_rollups_only_cover_own_rows() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let alice = register(&api, "alice");
    let bob = register(&api, "bob");
    let alice_project = api.create_project(&alice, "Shared Word", "").unwrap();
    api.update_document(&alice, alice_project, "shared word inside")
        .unwrap();
    api.create_project(&bob, "Bob Only", "").unwrap();

    let bob_page = api.list_projects(&bob, &ProjectFilter::default()).unwrap();
    assert_eq!(bob_page.total, 1);
    assert_eq!(bob_page.items[0].title, "Bob Only");

    let results = api.search_projects_and_documents(&bob, "shared").unwrap();
    assert!(results.projects.is_empty());
    assert!(results.documents.is_empty());

    let summary = api.get_analytics(&bob).unwrap();
    assert_eq!(summary.project_count, 1);
    assert_eq!(summary.history_count, 0);
    assert!(summary.recent_history.is_empty());
}

fn assert_not_found<T: std::fmt::Debug>(result: Result<T, CoreError>) {
    match result {
        Err(CoreError::NotFound { .. }) => {}
        other => panic!("expected not found, got {other:?}"),
    }
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
