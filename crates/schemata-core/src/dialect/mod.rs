//! Database dialect strategies.
//!
//! A [`Dialect`] owns every product-specific fragment of SQL text: parameter
//! placeholders, identifier masking, literal escaping, type names, function
//! spelling and DDL. It also reads the live schema back from the catalog.
//! The compiler and the migration planner only ever talk to `&dyn Dialect`.

mod sqlite;
mod sqlserver;

pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::AnyPool;

use crate::compiler::SqlCompiler;
use crate::error::{Error, Result};
use crate::model::{ColumnDescriptor, EntityModel, IndexDescriptor, Schema};
use crate::value::{Value, ValueType};
use crate::xpr::{Function, FunctionNode, ParameterNode};

/// Product-specific SQL generation and catalog access.
#[async_trait]
pub trait Dialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Writes a parameter placeholder.
    fn write_parameter(&self, parameter: &ParameterNode, out: &mut String) {
        match parameter {
            ParameterNode::Positional => out.push('?'),
            ParameterNode::Named(name) => {
                out.push('@');
                out.push_str(name);
            }
            ParameterNode::Indexed(index) => {
                out.push('@');
                out.push_str(&index.to_string());
            }
        }
    }

    /// Quotes an identifier (column name).
    fn mask_identifier(&self, name: &str) -> String {
        format!("[{name}]")
    }

    /// Writes a string literal, quotes included.
    ///
    /// The default backslash-escapes `'`, `%`, `_`, `\`, newline, carriage
    /// return and tab.
    fn write_string_literal(&self, text: &str, out: &mut String) {
        out.push('\'');
        for c in text.chars() {
            match c {
                '\'' | '%' | '_' | '\\' => {
                    out.push('\\');
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        }
        out.push('\'');
    }

    /// Database type for a generic type.
    fn type_name(&self, value_type: ValueType) -> Result<String>;

    /// Whether a live column type satisfies a target type.
    ///
    /// The default compares case-insensitively and treats `TEXT` and
    /// `VARCHAR` (with or without a length) as one class.
    fn types_equivalent(&self, live: &str, target: &str) -> bool {
        let class = |name: &str| {
            let name = name.trim().to_ascii_uppercase();
            let base = name.split('(').next().unwrap_or_default().trim().to_string();
            if base == "TEXT" || base == "VARCHAR" {
                "TEXT".to_string()
            } else {
                name
            }
        };
        class(live) == class(target)
    }

    /// Renders a function call, validating arity.
    fn write_function(&self, node: &FunctionNode, compiler: &mut SqlCompiler<'_>) -> Result<()> {
        write_common_function(self.name(), node, compiler)
    }

    /// Writes one column definition as used in `CREATE TABLE` and
    /// `ADD COLUMN`.
    fn write_column(&self, column: &ColumnDescriptor, out: &mut String) -> Result<()>;

    /// Writes the suffix that makes an `INSERT` return the new row id.
    fn write_return_identity(&self, out: &mut String) -> Result<()>;

    /// Physical name of a model index.
    fn index_name(&self, table: &str, index: &str) -> String {
        format!("idx_{table}_{index}")
    }

    /// Value used to populate a NOT NULL column that has no prior data and
    /// no default while rows are copied into a recreated table.
    fn fill_value(&self, value_type: Option<ValueType>) -> Value {
        match value_type {
            Some(ValueType::Int) => Value::Int(0),
            Some(ValueType::Bool) => Value::Bool(false),
            Some(ValueType::Float) => Value::Float(0.0),
            Some(ValueType::Blob) => Value::Blob(Vec::new()),
            Some(ValueType::Timestamp) => Value::Timestamp(NaiveDateTime::default()),
            Some(ValueType::Text) | None => Value::Text(String::new()),
        }
    }

    /// `CREATE TABLE` for a table model, unique groups included.
    fn create_table_sql(&self, model: &EntityModel) -> Result<String> {
        let mut sql = format!("CREATE TABLE {} (", model.table());
        for (i, column) in model.columns().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            self.write_column(column, &mut sql)?;
        }
        for unique in model.uniques() {
            sql.push_str(", UNIQUE(");
            sql.push_str(&self.mask_list(&unique.columns));
            sql.push(')');
        }
        sql.push(')');
        Ok(sql)
    }

    /// Statements that (re)create one model index.
    fn create_index_sql(&self, table: &str, index: &IndexDescriptor) -> Result<Vec<String>> {
        let name = self.index_name(table, &index.name);
        Ok(vec![
            format!("DROP INDEX IF EXISTS {name}"),
            format!(
                "CREATE INDEX {name} ON {table} ({})",
                self.mask_list(&index.columns)
            ),
        ])
    }

    /// `DROP INDEX` for a model index.
    fn drop_index_sql(&self, table: &str, index: &str) -> Result<String> {
        Ok(format!("DROP INDEX {}", self.index_name(table, index)))
    }

    /// `ALTER TABLE .. ADD COLUMN`.
    fn add_column_sql(&self, table: &str, column: &ColumnDescriptor) -> Result<String> {
        let mut sql = format!("ALTER TABLE {table} ADD COLUMN ");
        self.write_column(column, &mut sql)?;
        Ok(sql)
    }

    /// `ALTER TABLE .. ADD UNIQUE(..)`.
    fn add_unique_sql(&self, table: &str, unique: &IndexDescriptor) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {table} ADD UNIQUE({})",
            self.mask_list(&unique.columns)
        ))
    }

    /// `ALTER TABLE .. RENAME TO ..`.
    fn rename_table_sql(&self, from: &str, to: &str) -> Result<String> {
        Ok(format!("ALTER TABLE {from} RENAME TO {to}"))
    }

    /// `DROP TABLE`.
    fn drop_table_sql(&self, table: &str) -> Result<String> {
        Ok(format!("DROP TABLE {table}"))
    }

    /// `DROP VIEW`.
    fn drop_view_sql(&self, view: &str) -> Result<String> {
        Ok(format!("DROP VIEW {view}"))
    }

    /// Masks each name and joins them with commas.
    fn mask_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|name| self.mask_identifier(name))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Whether a table or view called `name` exists.
    async fn table_or_view_exists(&self, db: &AnyPool, name: &str) -> Result<bool>;

    /// Reads back one table or view.
    async fn read_schema(&self, db: &AnyPool, name: &str) -> Result<Schema>;

    /// Reads back every user table and view.
    async fn read_all_schemas(&self, db: &AnyPool) -> Result<Vec<Schema>>;
}

/// Renders the functions most products spell the same way: `COUNT`, `AVG`,
/// `SUM`, `MIN`, `MAX` and `COALESCE`. Anything else is unsupported.
pub fn write_common_function(
    dialect: &'static str,
    node: &FunctionNode,
    compiler: &mut SqlCompiler<'_>,
) -> Result<()> {
    let arguments = &node.arguments;
    let name = match node.function {
        Function::Count => {
            if arguments.is_empty() {
                compiler.write_str("COUNT(*)");
                return Ok(());
            }
            check_arity(node, arguments.len() == 1, "0 or 1")?;
            "COUNT"
        }
        Function::Average => {
            check_arity(node, arguments.len() == 1, "exactly 1")?;
            "AVG"
        }
        Function::Sum => {
            check_arity(node, arguments.len() == 1, "exactly 1")?;
            "SUM"
        }
        Function::Min => {
            check_arity(node, arguments.len() == 1, "exactly 1")?;
            "MIN"
        }
        Function::Max => {
            check_arity(node, arguments.len() == 1, "exactly 1")?;
            "MAX"
        }
        Function::Coalesce => {
            check_arity(node, !arguments.is_empty(), "at least 1")?;
            "COALESCE"
        }
        Function::Random => {
            return Err(Error::UnsupportedFunction {
                dialect,
                function: node.function.name(),
            });
        }
    };
    compiler.write_call(name, arguments)
}

/// Fails with [`Error::FunctionArity`] unless `ok` holds.
pub fn check_arity(node: &FunctionNode, ok: bool, expected: &'static str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::FunctionArity {
            function: node.function.name(),
            expected,
            actual: node.arguments.len(),
        })
    }
}
