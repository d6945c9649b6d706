use folio_core::{
    document_locks, open_db_in_memory, CoreConfig, CoreError, EntityKind, FolioApi, Identity,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn create_validates_and_trims_title() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");

    match api.create_project(&owner, "  ab ", "").unwrap_err() {
        CoreError::Validation(err) => assert!(err.has_field("title")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(count(&conn, "projects"), 0);
    assert_eq!(count(&conn, "documents"), 0);

    let project_id = api
        .create_project(&owner, "  Field Notes  ", "spring survey")
        .unwrap();
    let project = api.get_project(&owner, project_id).unwrap();
    assert_eq!(project.title, "Field Notes");
    assert_eq!(project.description, "spring survey");
    assert_eq!(project.owner_id, owner.user_id);
    assert_eq!(count(&conn, "documents"), 1);
}

#[test]
fn create_for_unknown_owner_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let ghost = Identity::new(Uuid::new_v4(), "ghost@example.com");

    let err = api.create_project(&ghost, "Haunted", "").unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound {
            kind: EntityKind::User,
            ..
        }
    ));
    assert_eq!(count(&conn, "projects"), 0);
}

#[test]
fn metadata_update_touches_only_given_fields() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let project_id = api.create_project(&owner, "Field Notes", "spring").unwrap();

    let renamed = api
        .update_project_metadata(&owner, project_id, Some("Survey Log".to_string()), None)
        .unwrap();
    assert_eq!(renamed.title, "Survey Log");
    assert_eq!(renamed.description, "spring");

    let unchanged = api
        .update_project_metadata(&owner, project_id, None, None)
        .unwrap();
    assert_eq!(unchanged, renamed);

    let described = api
        .update_project_metadata(&owner, project_id, None, Some(String::new()))
        .unwrap();
    assert_eq!(described.title, "Survey Log");
    assert_eq!(described.description, "");
}

#[test]
fn invalid_metadata_update_leaves_project_intact() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let project_id = api.create_project(&owner, "Field Notes", "spring").unwrap();

    let err = api
        .update_project_metadata(
            &owner,
            project_id,
            Some("x".repeat(201)),
            Some("ignored".to_string()),
        )
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    let project = api.get_project(&owner, project_id).unwrap();
    assert_eq!(project.title, "Field Notes");
    assert_eq!(project.description, "spring");
}

#[test]
fn delete_cascades_to_document_and_history() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let owner = register(&api, "ada");
    let project_id = api.create_project(&owner, "Field Notes", "").unwrap();
    api.update_document(&owner, project_id, "one").unwrap();
    api.update_document(&owner, project_id, "two").unwrap();
    let document_id = api.get_document(&owner, project_id).unwrap().id;

    let confirmation = api.delete_project(&owner, project_id).unwrap();
    assert_eq!(confirmation.project_id, project_id);
    assert_eq!(confirmation.document_id, Some(document_id));

    assert!(matches!(
        api.get_project(&owner, project_id),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        api.get_document(&owner, project_id),
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        api.list_history(&owner, document_id, None, None),
        Err(CoreError::NotFound { .. })
    ));
    assert_eq!(count(&conn, "documents"), 0);
    assert_eq!(count(&conn, "history"), 0);

    assert!(matches!(
        api.delete_project(&owner, project_id),
        Err(CoreError::NotFound { .. })
    ));
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

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
