//! SQL Server dialect.
//!
//! Only expression rendering is available: placeholders, bracket masking and
//! the common functions. Type mapping, DDL and catalog access report
//! [`Error::NotImplemented`] the first time they are used.

use async_trait::async_trait;
use sqlx::AnyPool;

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::model::{ColumnDescriptor, EntityModel, IndexDescriptor, Schema};
use crate::value::ValueType;

/// SQL Server dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl SqlServerDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

const fn not_implemented(operation: &'static str) -> Error {
    Error::NotImplemented {
        dialect: "sqlserver",
        operation,
    }
}

#[async_trait]
impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn type_name(&self, _value_type: ValueType) -> Result<String> {
        Err(not_implemented("type_name"))
    }

    fn write_column(&self, _column: &ColumnDescriptor, _out: &mut String) -> Result<()> {
        Err(not_implemented("write_column"))
    }

    fn write_return_identity(&self, _out: &mut String) -> Result<()> {
        Err(not_implemented("write_return_identity"))
    }

    fn create_table_sql(&self, _model: &EntityModel) -> Result<String> {
        Err(not_implemented("create_table_sql"))
    }

    fn create_index_sql(&self, _table: &str, _index: &IndexDescriptor) -> Result<Vec<String>> {
        Err(not_implemented("create_index_sql"))
    }

    fn drop_index_sql(&self, _table: &str, _index: &str) -> Result<String> {
        Err(not_implemented("drop_index_sql"))
    }

    fn add_column_sql(&self, _table: &str, _column: &ColumnDescriptor) -> Result<String> {
        Err(not_implemented("add_column_sql"))
    }

    fn add_unique_sql(&self, _table: &str, _unique: &IndexDescriptor) -> Result<String> {
        Err(not_implemented("add_unique_sql"))
    }

    fn rename_table_sql(&self, _from: &str, _to: &str) -> Result<String> {
        Err(not_implemented("rename_table_sql"))
    }

    fn drop_table_sql(&self, _table: &str) -> Result<String> {
        Err(not_implemented("drop_table_sql"))
    }

    fn drop_view_sql(&self, _view: &str) -> Result<String> {
        Err(not_implemented("drop_view_sql"))
    }

    async fn table_or_view_exists(&self, _db: &AnyPool, _name: &str) -> Result<bool> {
        Err(not_implemented("table_or_view_exists"))
    }

    async fn read_schema(&self, _db: &AnyPool, _name: &str) -> Result<Schema> {
        Err(not_implemented("read_schema"))
    }

    async fn read_all_schemas(&self, _db: &AnyPool) -> Result<Vec<Schema>> {
        Err(not_implemented("read_all_schemas"))
    }
}
