#![allow(dead_code)]

use schemata_core::{connect, DatabaseConfig, EntityModel, ValueType};
use sqlx::AnyPool;

pub async fn memory_pool() -> AnyPool {
    connect(&DatabaseConfig::new("sqlite::memory:").max_connections(1))
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory database: {e}"))
}

pub async fn exec(pool: &AnyPool, sql: &str) {
    sqlx::query(sql)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e}"));
}

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
