//! Schema read-back against a live SQLite database.

mod common;

use common::{create_entity, exec, memory_pool};
use schemata_core::dialect::{SqlServerDialect, SqliteDialect};
use schemata_core::model::same_index_set;
use schemata_core::{Dialect, Error, IndexDescriptor, Schema};

// =============================================================================
// Existence
// =============================================================================

#[tokio::test]
async fn test_exists_for_tables_and_views() {
    let pool = memory_pool().await;
    let dialect = SqliteDialect::new();

    assert!(!dialect.table_or_view_exists(&pool, "person").await.unwrap());

    exec(&pool, "CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT)").await;
    exec(&pool, "CREATE VIEW people AS SELECT name FROM person").await;
    exec(&pool, "CREATE INDEX idx_person_name ON person ([name])").await;

    assert!(dialect.table_or_view_exists(&pool, "person").await.unwrap());
    assert!(dialect.table_or_view_exists(&pool, "people").await.unwrap());
    assert!(
        !dialect.table_or_view_exists(&pool, "idx_person_name").await.unwrap(),
        "indices are neither tables nor views"
    );
}

#[tokio::test]
async fn test_lookups_ignore_case() {
    let pool = memory_pool().await;
    let dialect = SqliteDialect::new();
    exec(&pool, "CREATE TABLE person ([id] INTEGER PRIMARY KEY,[city] TEXT)").await;
    exec(&pool, "CREATE INDEX idx_person_city ON person ([city])").await;

    assert!(dialect.table_or_view_exists(&pool, "Person").await.unwrap());

    let Schema::Table(table) = dialect.read_schema(&pool, "PERSON").await.unwrap() else {
        panic!("expected a table");
    };
    assert_eq!(table.name, "person");
    assert_eq!(table.index("city").unwrap().columns, ["city"]);
}

// =============================================================================
// Read-back
// =============================================================================

#[tokio::test]
async fn test_read_back_generated_table() {
    let pool = memory_pool().await;
    let dialect = SqliteDialect::new();
    let model = create_entity();

    exec(&pool, &dialect.create_table_sql(&model).unwrap()).await;
    for index in model.indices() {
        for sql in dialect.create_index_sql(model.table(), index).unwrap() {
            exec(&pool, &sql).await;
        }
    }

    let Schema::Table(table) = dialect.read_schema(&pool, "createentity").await.unwrap() else {
        panic!("expected a table");
    };

    assert_eq!(table.name, "createentity");
    let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["id", "guid", "firstname", "lastname", "firstsec", "secondsec"]);

    let id = table.column("id").unwrap();
    assert_eq!(id.db_type, "INTEGER");
    assert!(id.primary_key && id.auto_increment);
    assert!(table.column("guid").unwrap().unique);

    let model_uniques: Vec<IndexDescriptor> = model.uniques().cloned().collect();
    assert!(same_index_set(&table.uniques, &model_uniques));

    assert_eq!(table.indices.len(), 1);
    assert_eq!(table.indices[0].name, "name");
    assert_eq!(table.indices[0].columns, ["firstname", "lastname"]);
}

#[tokio::test]
async fn test_read_back_view() {
    let pool = memory_pool().await;
    let dialect = SqliteDialect::new();
    exec(&pool, "CREATE TABLE person (id INTEGER, name TEXT)").await;
    exec(&pool, "CREATE VIEW people AS SELECT name FROM person").await;

    let schema = dialect.read_schema(&pool, "people").await.unwrap();
    assert_eq!(schema.kind(), "view");
    let Schema::View(view) = schema else {
        panic!("expected a view");
    };
    assert_eq!(view.sql, "CREATE VIEW people AS SELECT name FROM person");
}

#[tokio::test]
async fn test_read_all_skips_internal_tables() {
    let pool = memory_pool().await;
    let dialect = SqliteDialect::new();
    // AUTOINCREMENT makes SQLite create sqlite_sequence.
    exec(&pool, "CREATE TABLE a (id INTEGER PRIMARY KEY AUTOINCREMENT, v TEXT)").await;
    exec(&pool, "CREATE TABLE b (id INTEGER, w BLOB)").await;
    exec(&pool, "CREATE VIEW c AS SELECT v FROM a").await;

    let schemas = dialect.read_all_schemas(&pool).await.unwrap();
    let mut names: Vec<_> = schemas.iter().map(Schema::name).collect();
    names.sort_unstable();
    assert_eq!(names, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_read_missing_schema() {
    let pool = memory_pool().await;
    let err = SqliteDialect::new().read_schema(&pool, "ghost").await.unwrap_err();
    assert!(matches!(err, Error::SchemaNotFound(ref name) if name == "ghost"));
}

#[tokio::test]
async fn test_unparseable_definition_is_a_hard_error() {
    let pool = memory_pool().await;
    exec(&pool, "CREATE TABLE pair (a INTEGER, b INTEGER, PRIMARY KEY (a, b))").await;
    let err = SqliteDialect::new().read_schema(&pool, "pair").await.unwrap_err();
    assert!(matches!(err, Error::SchemaParse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_foreign_index_is_a_hard_error() {
    let pool = memory_pool().await;
    exec(&pool, "CREATE TABLE person (id INTEGER, name TEXT)").await;
    exec(&pool, "CREATE INDEX by_name ON person (name)").await;
    let err = SqliteDialect::new().read_schema(&pool, "person").await.unwrap_err();
    assert!(matches!(err, Error::SchemaParse { .. }), "got {err:?}");
}

// =============================================================================
// Unfinished dialect
// =============================================================================

#[tokio::test]
async fn test_sqlserver_catalog_is_not_implemented() {
    let pool = memory_pool().await;
    let dialect = SqlServerDialect::new();
    assert!(matches!(
        dialect.table_or_view_exists(&pool, "x").await,
        Err(Error::NotImplemented { operation: "table_or_view_exists", .. })
    ));
    assert!(matches!(
        dialect.read_all_schemas(&pool).await,
        Err(Error::NotImplemented { .. })
    ));
}
