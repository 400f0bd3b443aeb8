use crate::compiler::SqlCompiler;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::statement::PreparedStatement;
use crate::xpr::Node;

/// `DELETE` assembler.
#[derive(Debug, Clone)]
pub struct Delete {
    table: String,
    filter: Option<Node>,
}

impl Delete {
    /// Starts a delete from `table`.
    pub fn from_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
        }
    }

    /// Sets the `WHERE` condition.
    #[must_use]
    pub fn filter(mut self, condition: Node) -> Self {
        self.filter = Some(condition);
        self
    }

    /// Renders the statement.
    pub fn prepare(&self, dialect: &dyn Dialect) -> Result<PreparedStatement> {
        let mut sql = format!("DELETE FROM {}", self.table);
        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            SqlCompiler::new(dialect, &mut sql).visit(filter)?;
        }
        Ok(PreparedStatement::new(sql))
    }
}
