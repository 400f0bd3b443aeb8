use crate::compiler::SqlCompiler;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::model::EntityModel;
use crate::statement::{PreparedOperation, PreparedStatement};
use crate::xpr::Node;

#[derive(Debug, Clone)]
enum Source {
    Values(Vec<Node>),
    Select(String),
}

/// `INSERT` assembler, either `VALUES (..)` or `INSERT .. SELECT`.
#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    columns: Vec<String>,
    source: Source,
    return_identity: bool,
}

impl Insert {
    /// Starts an insert into `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            source: Source::Values(Vec::new()),
            return_identity: false,
        }
    }

    /// Starts an insert into a model's table.
    #[must_use]
    pub fn model(model: &EntityModel) -> Self {
        Self::table(model.table())
    }

    /// Adds a column and the expression it receives.
    #[must_use]
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Node>) -> Self {
        let value = value.into();
        match &mut self.source {
            Source::Values(values) => values.push(value),
            Source::Select(_) => {
                self.columns.clear();
                self.source = Source::Values(vec![value]);
            }
        }
        self.columns.push(column.into());
        self
    }

    /// Adds a model field and the expression it receives.
    pub fn field(self, model: &EntityModel, field: &str, value: impl Into<Node>) -> Result<Self> {
        let column = model.field(field)?.name.clone();
        Ok(self.value(column, value))
    }

    /// Fills `columns` from the rows of a prepared query.
    #[must_use]
    pub fn select<I, S>(mut self, columns: I, query: &impl PreparedOperation) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self.source = Source::Select(query.command().to_string());
        self
    }

    /// Makes the statement return the identity of the new row.
    #[must_use]
    pub const fn return_identity(mut self) -> Self {
        self.return_identity = true;
        self
    }

    /// Renders the statement.
    pub fn prepare(&self, dialect: &dyn Dialect) -> Result<PreparedStatement> {
        let mut sql = format!("INSERT INTO {} (", self.table);
        sql.push_str(&dialect.mask_list(&self.columns));
        sql.push(')');

        match &self.source {
            Source::Values(values) => {
                sql.push_str(" VALUES (");
                SqlCompiler::new(dialect, &mut sql).visit_list(values)?;
                sql.push(')');
            }
            Source::Select(query) => {
                sql.push(' ');
                sql.push_str(query);
            }
        }

        if self.return_identity {
            dialect.write_return_identity(&mut sql)?;
        }
        Ok(PreparedStatement::new(sql))
    }
}
