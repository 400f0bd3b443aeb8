//! Prepared statements and the statement builders that produce them.
//!
//! Builders assemble clauses and hand every expression to the compiler;
//! the result is a [`PreparedStatement`] holding finished command text.
//! Execution accepts anything that implements `sqlx::Executor` for the
//! `Any` driver, so the same statement runs on a pool or inside an open
//! transaction.

mod delete;
mod insert;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use select::{Join, JoinKind, Order, Select};
pub use update::Update;

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::query::Query;
use sqlx::{Any, Executor, Row};
use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{Value, TIMESTAMP_FORMAT};

/// Something that carries finished command text.
pub trait PreparedOperation {
    /// The SQL text.
    fn command(&self) -> &str;
}

/// Finished command text, ready to run with positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    command: String,
}

impl PreparedOperation for PreparedStatement {
    fn command(&self) -> &str {
        &self.command
    }
}

impl PreparedStatement {
    /// Wraps command text.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Runs the statement and returns the number of affected rows.
    pub async fn execute<'e, E>(&self, executor: E, args: &[Value]) -> Result<u64>
    where
        E: Executor<'e, Database = Any>,
    {
        debug!(sql = %self.command, "Executing SQL");
        let result = bind_values(sqlx::query(&self.command), args)
            .execute(executor)
            .await
            .map_err(|e| Error::execution(&self.command, e))?;
        Ok(result.rows_affected())
    }

    /// Runs the statement and returns every row.
    pub async fn fetch_all<'e, E>(&self, executor: E, args: &[Value]) -> Result<Vec<Vec<Value>>>
    where
        E: Executor<'e, Database = Any>,
    {
        debug!(sql = %self.command, "Fetching rows");
        let rows = bind_values(sqlx::query(&self.command), args)
            .fetch_all(executor)
            .await
            .map_err(|e| Error::execution(&self.command, e))?;
        rows.iter()
            .map(|row| (0..row.len()).map(|i| decode_column(row, i)).collect())
            .collect()
    }

    /// Runs a single-column statement and returns the first value.
    ///
    /// Fails with [`Error::UnexpectedColumnCount`] when the result is wider
    /// than one column and [`Error::NoRows`] when it is empty.
    pub async fn execute_scalar<'e, E>(&self, executor: E, args: &[Value]) -> Result<Value>
    where
        E: Executor<'e, Database = Any>,
    {
        debug!(sql = %self.command, "Fetching scalar");
        let row = bind_values(sqlx::query(&self.command), args)
            .fetch_optional(executor)
            .await
            .map_err(|e| Error::execution(&self.command, e))?
            .ok_or(Error::NoRows)?;
        expect_single_column(&row)?;
        decode_column(&row, 0)
    }

    /// Runs a single-column statement and returns the column of every row.
    pub async fn execute_set<'e, E>(&self, executor: E, args: &[Value]) -> Result<Vec<Value>>
    where
        E: Executor<'e, Database = Any>,
    {
        debug!(sql = %self.command, "Fetching set");
        let rows = bind_values(sqlx::query(&self.command), args)
            .fetch_all(executor)
            .await
            .map_err(|e| Error::execution(&self.command, e))?;
        rows.iter()
            .map(|row| {
                expect_single_column(row)?;
                decode_column(row, 0)
            })
            .collect()
    }
}

fn expect_single_column(row: &AnyRow) -> Result<()> {
    match row.len() {
        1 => Ok(()),
        actual => Err(Error::UnexpectedColumnCount {
            expected: 1,
            actual,
        }),
    }
}

fn bind_values<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    args: &[Value],
) -> Query<'q, Any, AnyArguments<'q>> {
    for arg in args {
        query = match arg {
            Value::Null => query.bind(None::<i64>),
            Value::Bool(b) => query.bind(*b),
            Value::Int(n) => query.bind(*n),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.clone()),
            Value::Blob(bytes) => query.bind(bytes.clone()),
            Value::Timestamp(ts) => query.bind(ts.format(TIMESTAMP_FORMAT).to_string()),
        };
    }
    query
}

fn decode_column(row: &AnyRow, index: usize) -> Result<Value> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map_or(Value::Null, Value::Int));
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Ok(Value::Float(value));
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Ok(Value::Text(value));
    }
    if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
        return Ok(Value::Blob(value));
    }
    row.try_get::<bool, _>(index)
        .map(Value::Bool)
        .map_err(|source| Error::Decode { index, source })
}
