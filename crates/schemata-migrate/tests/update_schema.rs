//! End-to-end schema updates against an in-memory SQLite database.

mod common;

use common::{create_entity, exec, exists, live_table, updater, LEGACY_CREATE_ENTITY};
use schemata_core::{EntityModel, Schema, ValueType};
use schemata_migrate::diff::TableDiff;
use schemata_migrate::updater::{AdditiveReport, SchemaUpdate};
use schemata_migrate::MigrateError;

// =============================================================================
// Missing objects
// =============================================================================

#[tokio::test]
async fn test_creates_missing_table_and_indices() {
    let updater = updater().await;
    let model = create_entity();

    let outcome = updater.update_schema(&model).await.unwrap();
    assert_eq!(outcome, SchemaUpdate::Created);

    let table = live_table(&updater, "createentity").await;
    assert_eq!(table.columns.len(), 6);
    assert_eq!(table.index("name").unwrap().columns, ["firstname", "lastname"]);
    assert_eq!(table.uniques.len(), 1);
}

#[tokio::test]
async fn test_creates_missing_view() {
    let updater = updater().await;
    exec(updater.pool(), "CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT)").await;

    let model = EntityModel::view("people", "CREATE VIEW people AS SELECT name FROM person");
    assert_eq!(updater.update_schema(&model).await.unwrap(), SchemaUpdate::Created);

    let schema = updater.dialect().read_schema(updater.pool(), "people").await.unwrap();
    assert_eq!(schema.kind(), "view");
}

// =============================================================================
// Round trip and idempotence
// =============================================================================

#[tokio::test]
async fn test_created_table_reads_back_without_differences() {
    let updater = updater().await;
    let model = create_entity();
    updater.update_schema(&model).await.unwrap();

    let table = live_table(&updater, "createentity").await;
    let diff = TableDiff::compute(&model, &table, updater.dialect()).unwrap();
    assert!(diff.is_empty(), "unexpected differences: {diff:?}");
}

#[tokio::test]
async fn test_second_update_is_empty_additive_pass() {
    let updater = updater().await;
    let model = create_entity();
    updater.update_schema(&model).await.unwrap();

    let outcome = updater.update_schema(&model).await.unwrap();
    assert_eq!(outcome, SchemaUpdate::Additive(AdditiveReport::default()));
    assert!(outcome.is_noop());
}

#[tokio::test]
async fn test_model_name_case_does_not_recreate() {
    let updater = updater().await;
    let model = |table: &str| {
        EntityModel::builder(table)
            .field("ID", ValueType::Int, "primarykey,autoincrement")
            .field("City", ValueType::Text, "index=city")
            .build()
            .unwrap()
    };
    updater.update_schema(&model("person")).await.unwrap();

    let outcome = updater.update_schema(&model("Person")).await.unwrap();
    assert!(outcome.is_noop(), "unexpected update: {outcome:?}");
}

// =============================================================================
// Recreate
// =============================================================================

#[tokio::test]
async fn test_new_unique_group_recreates_and_keeps_rows() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, LEGACY_CREATE_ENTITY).await;
    exec(
        pool,
        "INSERT INTO createentity (guid, firstname, lastname) VALUES ('g1', 'Ada', 'Lovelace'), ('g2', 'Alan', 'Turing')",
    )
    .await;

    let SchemaUpdate::Recreated(report) = updater.update_schema(&create_entity()).await.unwrap()
    else {
        panic!("expected a recreate");
    };
    assert_eq!(report.copied_columns, ["id", "guid", "firstname", "lastname"]);
    assert!(report.filled_columns.is_empty());
    assert!(report.dropped_columns.is_empty());
    assert_eq!(report.rows_copied, 2);

    type Row = (i64, String, String, String, Option<String>, Option<String>);
    let rows: Vec<Row> = sqlx::query_as(
        "SELECT id, guid, firstname, lastname, firstsec, secondsec FROM createentity ORDER BY id",
    )
    .fetch_all(pool)
    .await
    .unwrap();
    let expected: Vec<Row> = vec![
        (1, "g1".into(), "Ada".into(), "Lovelace".into(), None, None),
        (2, "g2".into(), "Alan".into(), "Turing".into(), None, None),
    ];
    assert_eq!(rows, expected);

    assert!(!exists(&updater, "createentity_original").await);
    let table = live_table(&updater, "createentity").await;
    assert!(TableDiff::compute(&create_entity(), &table, updater.dialect())
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_failed_recreate_restores_original_table() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, "CREATE TABLE person ([id] INTEGER PRIMARY KEY AUTOINCREMENT,[name] TEXT,[city] TEXT)").await;
    exec(pool, "CREATE INDEX idx_person_city ON person ([city])").await;
    exec(pool, "INSERT INTO person (name, city) VALUES ('Ada', 'London'), ('Ada', 'Paris')").await;

    let model = EntityModel::builder("person")
        .field("ID", ValueType::Int, "primarykey,autoincrement")
        .field("Name", ValueType::Text, "unique=names")
        .field("City", ValueType::Text, "index=city")
        .build()
        .unwrap();

    let err = updater.update_schema(&model).await.unwrap_err();
    assert!(matches!(err, MigrateError::Core(_)), "unexpected error: {err}");
    assert!(!exists(&updater, "person_original").await);

    let table = live_table(&updater, "person").await;
    assert!(table.uniques.is_empty());
    assert_eq!(table.index("city").unwrap().columns, ["city"]);

    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT name, city FROM person ORDER BY id")
            .fetch_all(pool)
            .await
            .unwrap();
    let expected: Vec<(String, String)> = vec![
        ("Ada".into(), "London".into()),
        ("Ada".into(), "Paris".into()),
    ];
    assert_eq!(rows, expected);

    // The data still violates the model, so a retry fails the same way.
    assert!(matches!(
        updater.update_schema(&model).await,
        Err(MigrateError::Core(_))
    ));
}

#[tokio::test]
async fn test_leftover_backup_blocks_update() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, LEGACY_CREATE_ENTITY).await;
    exec(pool, "CREATE TABLE createentity_original (leftover TEXT)").await;

    let err = updater.update_schema(&create_entity()).await.unwrap_err();
    let MigrateError::PendingBackup { table, backup } = err else {
        panic!("expected a pending backup, got {err}");
    };
    assert_eq!(table, "createentity");
    assert_eq!(backup, "createentity_original");
    assert!(exists(&updater, "createentity_original").await);
    assert_eq!(live_table(&updater, "createentity").await.columns.len(), 4);
}

#[tokio::test]
async fn test_restore_backup_replaces_partial_table() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, "CREATE TABLE person_original ([id] INTEGER PRIMARY KEY,[name] TEXT)").await;
    exec(pool, "INSERT INTO person_original (name) VALUES ('Ada')").await;
    exec(pool, "CREATE TABLE person ([id] INTEGER PRIMARY KEY,[name] TEXT UNIQUE)").await;

    updater.restore_backup("person").await.unwrap();

    assert!(!exists(&updater, "person_original").await);
    let table = live_table(&updater, "person").await;
    assert!(!table.column("name").unwrap().unique);
    let names: Vec<(String,)> = sqlx::query_as("SELECT name FROM person")
        .fetch_all(pool)
        .await
        .unwrap();
    assert_eq!(names, vec![("Ada".to_string(),)]);
}

#[tokio::test]
async fn test_restore_backup_after_interrupted_rename() {
    let updater = updater().await;
    exec(updater.pool(), "CREATE TABLE person_original ([id] INTEGER PRIMARY KEY)").await;

    updater.restore_backup("person").await.unwrap();
    assert!(exists(&updater, "person").await);
    assert!(!exists(&updater, "person_original").await);
}

#[tokio::test]
async fn test_discard_backup_unblocks_update() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, LEGACY_CREATE_ENTITY).await;
    exec(pool, "CREATE TABLE createentity_original (leftover TEXT)").await;

    updater.discard_backup("createentity").await.unwrap();
    assert!(!exists(&updater, "createentity_original").await);

    let outcome = updater.update_schema(&create_entity()).await.unwrap();
    assert!(matches!(outcome, SchemaUpdate::Recreated(_)));
}

#[tokio::test]
async fn test_missing_backup_is_reported() {
    let updater = updater().await;
    assert!(matches!(
        updater.restore_backup("person").await,
        Err(MigrateError::NoBackup(name)) if name == "person_original"
    ));
    assert!(matches!(
        updater.discard_backup("person").await,
        Err(MigrateError::NoBackup(_))
    ));
}

#[tokio::test]
async fn test_recreate_fills_required_columns() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, "CREATE TABLE person ([id] INTEGER PRIMARY KEY AUTOINCREMENT,[name] TEXT,[nickname] TEXT)").await;
    exec(pool, "INSERT INTO person (name, nickname) VALUES ('Ada', 'countess'), (NULL, NULL)").await;

    let model = EntityModel::builder("person")
        .field("ID", ValueType::Int, "primarykey,autoincrement")
        .field("Name", ValueType::Text, "notnull")
        .field("Age", ValueType::Int, "notnull")
        .build()
        .unwrap();

    let SchemaUpdate::Recreated(report) = updater.update_schema(&model).await.unwrap() else {
        panic!("expected a recreate");
    };
    assert_eq!(report.copied_columns, ["id", "name"]);
    assert_eq!(report.filled_columns, ["age"]);
    assert_eq!(report.dropped_columns, ["nickname"]);

    let rows: Vec<(i64, String, i64)> =
        sqlx::query_as("SELECT id, name, age FROM person ORDER BY id")
            .fetch_all(pool)
            .await
            .unwrap();
    let expected: Vec<(i64, String, i64)> = vec![(1, "Ada".into(), 0), (2, String::new(), 0)];
    assert_eq!(rows, expected);
}

// =============================================================================
// Additive
// =============================================================================

#[tokio::test]
async fn test_plain_column_is_added_in_place() {
    let updater = updater().await;
    let pool = updater.pool();
    let before = EntityModel::builder("person")
        .field("ID", ValueType::Int, "primarykey,autoincrement")
        .field("Name", ValueType::Text, "")
        .build()
        .unwrap();
    updater.update_schema(&before).await.unwrap();
    exec(pool, "INSERT INTO person (name) VALUES ('Ada'), ('Alan')").await;

    let after = EntityModel::builder("person")
        .field("ID", ValueType::Int, "primarykey,autoincrement")
        .field("Name", ValueType::Text, "")
        .field("Email", ValueType::Text, "")
        .build()
        .unwrap();
    let outcome = updater.update_schema(&after).await.unwrap();
    assert_eq!(
        outcome,
        SchemaUpdate::Additive(AdditiveReport {
            added_columns: vec!["email".into()],
            ..AdditiveReport::default()
        })
    );

    let rows: Vec<(i64, String, Option<String>)> =
        sqlx::query_as("SELECT id, name, email FROM person ORDER BY id")
            .fetch_all(pool)
            .await
            .unwrap();
    let expected: Vec<(i64, String, Option<String>)> =
        vec![(1, "Ada".into(), None), (2, "Alan".into(), None)];
    assert_eq!(rows, expected);

    let table = live_table(&updater, "person").await;
    let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "email"]);
}

#[tokio::test]
async fn test_renamed_index_is_rebuilt_in_place() {
    let updater = updater().await;
    let pool = updater.pool();
    let model = create_entity();
    updater.update_schema(&model).await.unwrap();
    exec(pool, "DROP INDEX idx_createentity_name").await;
    exec(
        pool,
        "CREATE INDEX idx_createentity_fullname ON createentity ([lastname],[firstname])",
    )
    .await;

    let SchemaUpdate::Additive(report) = updater.update_schema(&model).await.unwrap() else {
        panic!("expected an in-place update");
    };
    assert_eq!(report.dropped_indices, ["fullname"]);
    assert_eq!(report.created_indices, ["name"]);

    let table = live_table(&updater, "createentity").await;
    assert_eq!(table.indices.len(), 1);
    assert_eq!(table.index("name").unwrap().columns, ["firstname", "lastname"]);
}

// =============================================================================
// Views
// =============================================================================

#[tokio::test]
async fn test_live_view_is_replaced() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, "CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)").await;
    exec(pool, "CREATE VIEW adults AS SELECT name FROM person WHERE age >= 18").await;

    let query = "CREATE VIEW adults AS SELECT id, name FROM person WHERE age >= 21";
    let outcome = updater
        .update_schema(&EntityModel::view("adults", query))
        .await
        .unwrap();
    assert_eq!(outcome, SchemaUpdate::ViewReplaced);

    let Schema::View(view) = updater.dialect().read_schema(pool, "adults").await.unwrap() else {
        panic!("expected a view");
    };
    assert_eq!(view.sql, query);
}

#[tokio::test]
async fn test_view_is_replaced_by_table_model() {
    let updater = updater().await;
    let pool = updater.pool();
    exec(pool, "CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT)").await;
    exec(pool, "CREATE VIEW createentity AS SELECT id FROM person").await;

    let outcome = updater.update_schema(&create_entity()).await.unwrap();
    assert_eq!(outcome, SchemaUpdate::ViewReplaced);
    assert_eq!(live_table(&updater, "createentity").await.columns.len(), 6);
}

#[tokio::test]
async fn test_view_model_over_table_is_rejected() {
    let updater = updater().await;
    exec(updater.pool(), LEGACY_CREATE_ENTITY).await;

    let model = EntityModel::view(
        "createentity",
        "CREATE VIEW createentity AS SELECT 1 AS id",
    );
    let err = updater.update_schema(&model).await.unwrap_err();
    assert!(matches!(err, MigrateError::SchemaMismatch(_)), "got {err:?}");
    assert!(exists(&updater, "createentity").await);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_failed_in_place_update_rolls_back() {
    let updater = updater().await;
    let pool = updater.pool();
    let model = create_entity();
    updater.update_schema(&model).await.unwrap();
    exec(pool, "DROP INDEX idx_createentity_name").await;
    exec(
        pool,
        "CREATE INDEX idx_createentity_fullname ON createentity ([firstname],[lastname])",
    )
    .await;

    let broken = EntityModel::builder("createentity")
        .field("ID", ValueType::Int, "primarykey,autoincrement")
        .field("GUID", ValueType::Text, "unique")
        .field("Firstname", ValueType::Text, "index=name")
        .field("Lastname", ValueType::Text, "index=name")
        .field("Firstsec", ValueType::Text, "unique=secret")
        .field("Secondsec", ValueType::Text, "unique=secret")
        .field("Extra", ValueType::Text, "default=(")
        .build()
        .unwrap();

    let err = updater.update_schema(&broken).await.unwrap_err();
    assert!(matches!(err, MigrateError::Core(_)), "got {err:?}");

    let table = live_table(&updater, "createentity").await;
    assert!(table.column("extra").is_none());
    assert!(table.index("fullname").is_some());
}
