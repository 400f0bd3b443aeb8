//! SQLite dialect.
//!
//! Identifiers are masked with brackets and string literals double their
//! quotes, since SQLite does not honour backslash escapes. The live schema
//! is recovered by parsing the DDL text stored in `sqlite_master`.

mod catalog;

use async_trait::async_trait;
use sqlx::AnyPool;
use tracing::debug;

use crate::compiler::SqlCompiler;
use crate::dialect::{check_arity, write_common_function, Dialect};
use crate::error::{Error, Result};
use crate::model::{ColumnDescriptor, Schema, View};
use crate::value::ValueType;
use crate::xpr::{Function, FunctionNode};

// Object names compare without regard to case, as SQLite itself resolves them.
const EXISTS_QUERY: &str = "SELECT name FROM sqlite_master WHERE (type='table' OR type='view') AND name = ? COLLATE NOCASE";
const SCHEMA_QUERY: &str =
    "SELECT type, tbl_name, sql FROM sqlite_master WHERE name = ? COLLATE NOCASE";
const ALL_SCHEMAS_QUERY: &str =
    "SELECT type, tbl_name, sql FROM sqlite_master WHERE type='view' OR type='table'";
const INDEX_QUERY: &str =
    "SELECT sql FROM sqlite_master WHERE type='index' AND tbl_name = ? COLLATE NOCASE AND sql IS NOT NULL";

/// SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    async fn read_indices(
        &self,
        db: &AnyPool,
        table: &str,
    ) -> Result<Vec<crate::model::IndexDescriptor>> {
        debug!(sql = %INDEX_QUERY, table = %table, "Reading indices");
        let rows: Vec<(String,)> = sqlx::query_as(INDEX_QUERY)
            .bind(table)
            .fetch_all(db)
            .await
            .map_err(|e| Error::execution(INDEX_QUERY, e))?;
        rows.iter()
            .map(|(sql,)| catalog::parse_index(table, sql))
            .collect()
    }

    async fn to_schema(
        &self,
        db: &AnyPool,
        kind: &str,
        name: &str,
        sql: &str,
    ) -> Result<Schema> {
        match kind {
            "table" => {
                let mut table = catalog::parse_table(name, sql)?;
                table.indices = self.read_indices(db, name).await?;
                Ok(Schema::Table(table))
            }
            "view" => Ok(Schema::View(View {
                name: name.to_string(),
                sql: sql.to_string(),
            })),
            _ => Err(Error::UnsupportedSchemaType {
                name: name.to_string(),
                kind: kind.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn write_string_literal(&self, text: &str, out: &mut String) {
        out.push('\'');
        out.push_str(&text.replace('\'', "''"));
        out.push('\'');
    }

    fn type_name(&self, value_type: ValueType) -> Result<String> {
        let name = match value_type {
            ValueType::Bool => "BOOLEAN",
            ValueType::Int => "INTEGER",
            ValueType::Float => "FLOAT",
            ValueType::Text => "TEXT",
            ValueType::Blob => "BLOB",
            ValueType::Timestamp => "TIMESTAMP",
        };
        Ok(name.to_string())
    }

    fn write_function(&self, node: &FunctionNode, compiler: &mut SqlCompiler<'_>) -> Result<()> {
        if node.function == Function::Random {
            check_arity(node, node.arguments.is_empty(), "no")?;
            compiler.write_str("RANDOM()");
            return Ok(());
        }
        write_common_function(self.name(), node, compiler)
    }

    fn write_column(&self, column: &ColumnDescriptor, out: &mut String) -> Result<()> {
        out.push_str(&self.mask_identifier(&column.name));
        out.push(' ');
        out.push_str(&column.resolved_type(self)?);
        if column.primary_key {
            out.push_str(" PRIMARY KEY");
        }
        if column.auto_increment {
            out.push_str(" AUTOINCREMENT");
        }
        if column.unique {
            out.push_str(" UNIQUE");
        }
        if column.not_null {
            out.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            out.push_str(" DEFAULT ");
            out.push_str(default);
        }
        Ok(())
    }

    fn write_return_identity(&self, out: &mut String) -> Result<()> {
        out.push_str(" RETURNING rowid");
        Ok(())
    }

    async fn table_or_view_exists(&self, db: &AnyPool, name: &str) -> Result<bool> {
        debug!(sql = %EXISTS_QUERY, name = %name, "Checking existence");
        let row: Option<(String,)> = sqlx::query_as(EXISTS_QUERY)
            .bind(name)
            .fetch_optional(db)
            .await
            .map_err(|e| Error::execution(EXISTS_QUERY, e))?;
        Ok(row.is_some())
    }

    async fn read_schema(&self, db: &AnyPool, name: &str) -> Result<Schema> {
        debug!(sql = %SCHEMA_QUERY, name = %name, "Reading schema");
        let row: Option<(String, String, Option<String>)> = sqlx::query_as(SCHEMA_QUERY)
            .bind(name)
            .fetch_optional(db)
            .await
            .map_err(|e| Error::execution(SCHEMA_QUERY, e))?;
        let Some((kind, table, sql)) = row else {
            return Err(Error::SchemaNotFound(name.to_string()));
        };
        let sql = sql.ok_or_else(|| Error::SchemaParse {
            definition: format!("{kind} {table} has no stored definition"),
        })?;
        self.to_schema(db, &kind, &table, &sql).await
    }

    async fn read_all_schemas(&self, db: &AnyPool) -> Result<Vec<Schema>> {
        debug!(sql = %ALL_SCHEMAS_QUERY, "Reading all schemas");
        let rows: Vec<(String, String, Option<String>)> = sqlx::query_as(ALL_SCHEMAS_QUERY)
            .fetch_all(db)
            .await
            .map_err(|e| Error::execution(ALL_SCHEMAS_QUERY, e))?;

        let mut schemas = Vec::with_capacity(rows.len());
        for (kind, name, sql) in rows {
            let Some(sql) = sql else { continue };
            if name.starts_with("sqlite") {
                continue;
            }
            schemas.push(self.to_schema(db, &kind, &name, &sql).await?);
        }
        Ok(schemas)
    }
}
