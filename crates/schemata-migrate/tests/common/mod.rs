#![allow(dead_code)]

use std::sync::Arc;

use schemata_core::dialect::SqliteDialect;
use schemata_core::model::Table;
use schemata_core::{connect, DatabaseConfig, EntityModel, Schema, ValueType};
use schemata_migrate::updater::SchemaUpdater;
use sqlx::AnyPool;

pub async fn memory_pool() -> AnyPool {
    connect(&DatabaseConfig::new("sqlite::memory:").max_connections(1))
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory database: {e}"))
}

pub async fn updater() -> SchemaUpdater {
    SchemaUpdater::new(memory_pool().await, Arc::new(SqliteDialect::new()))
}

pub async fn exec(pool: &AnyPool, sql: &str) {
    sqlx::query(sql)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e}"));
}

pub async fn live_table(updater: &SchemaUpdater, name: &str) -> Table {
    match updater.dialect().read_schema(updater.pool(), name).await.unwrap() {
        Schema::Table(table) => table,
        Schema::View(view) => panic!("expected a table, found view {}", view.name),
    }
}

pub async fn exists(updater: &SchemaUpdater, name: &str) -> bool {
    updater
        .dialect()
        .table_or_view_exists(updater.pool(), name)
        .await
        .unwrap()
}

/// Person records as created by an older release of the application.
pub const LEGACY_CREATE_ENTITY: &str = "CREATE TABLE createentity (id INTEGER PRIMARY KEY AUTOINCREMENT, guid TEXT UNIQUE, firstname TEXT, lastname TEXT)";

pub fn create_entity() -> EntityModel {
    EntityModel::builder("createentity")
        .field("ID", ValueType::Int, "primarykey,autoincrement")
        .field("GUID", ValueType::Text, "unique")
        .field("Firstname", ValueType::Text, "index=name")
        .field("Lastname", ValueType::Text, "index=name")
        .field("Firstsec", ValueType::Text, "unique=secret")
        .field("Secondsec", ValueType::Text, "unique=secret")
        .build()
        .unwrap()
}
