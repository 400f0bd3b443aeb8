use crate::compiler::SqlCompiler;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::model::EntityModel;
use crate::statement::PreparedStatement;
use crate::xpr::{self, Node};

/// `UPDATE` assembler.
#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    assignments: Vec<Node>,
    filter: Option<Node>,
}

impl Update {
    /// Starts an update of `table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            filter: None,
        }
    }

    /// Adds `column = value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Node>) -> Self {
        self.assignments.push(xpr::assign(xpr::column(column), value));
        self
    }

    /// Adds `field = value` for a model field.
    pub fn set_field(
        mut self,
        model: &EntityModel,
        field: &str,
        value: impl Into<Node>,
    ) -> Result<Self> {
        self.assignments.push(xpr::assign(xpr::field(model, field)?, value));
        Ok(self)
    }

    /// Sets the `WHERE` condition.
    #[must_use]
    pub fn filter(mut self, condition: Node) -> Self {
        self.filter = Some(condition);
        self
    }

    /// Renders the statement.
    pub fn prepare(&self, dialect: &dyn Dialect) -> Result<PreparedStatement> {
        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut compiler = SqlCompiler::new(dialect, &mut sql);
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                compiler.write_str(", ");
            }
            compiler.visit(assignment)?;
        }
        if let Some(filter) = &self.filter {
            compiler.write_str(" WHERE ");
            compiler.visit(filter)?;
        }
        Ok(PreparedStatement::new(sql))
    }
}
