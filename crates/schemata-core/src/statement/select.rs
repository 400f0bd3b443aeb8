use crate::compiler::SqlCompiler;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::model::EntityModel;
use crate::statement::{PreparedOperation, PreparedStatement};
use crate::xpr::{self, Node};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Kinds of join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
}

/// One joined table.
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    table: String,
    alias: Option<String>,
    predicate: Option<Node>,
}

impl Join {
    /// `INNER JOIN table`.
    pub fn inner(table: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Inner,
            table: table.into(),
            alias: None,
            predicate: None,
        }
    }

    /// Names the joined table `AS alias`.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Sets the `ON` predicate.
    #[must_use]
    pub fn on(mut self, predicate: Node) -> Self {
        self.predicate = Some(predicate);
        self
    }

    fn write(&self, compiler: &mut SqlCompiler<'_>) -> Result<()> {
        compiler.write_str(match self.kind {
            JoinKind::Inner => " INNER JOIN ",
        });
        compiler.write_str(&self.table);
        if let Some(alias) = &self.alias {
            compiler.write_str(" AS ");
            compiler.write_str(alias);
        }
        if let Some(predicate) = &self.predicate {
            compiler.write_str(" ON ");
            compiler.visit(predicate)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Union {
    command: String,
    all: bool,
}

/// `SELECT` assembler.
///
/// Clauses render in the order `FROM`, joins, `WHERE`, `GROUP BY`,
/// `UNION`, `ORDER BY`, `LIMIT`, `OFFSET`; sorting and limits therefore
/// apply to the whole compound when a union is present.
#[derive(Debug, Clone, Default)]
pub struct Select {
    columns: Vec<Node>,
    from: Option<Node>,
    alias: Option<String>,
    joins: Vec<Join>,
    filter: Option<Node>,
    group_by: Vec<Node>,
    union: Option<Union>,
    order_by: Vec<(Node, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    /// Starts an empty `SELECT`; without columns it selects `*`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every column of `model` from its table.
    #[must_use]
    pub fn model(model: &EntityModel) -> Self {
        Self::new()
            .columns(model.columns().map(|c| xpr::column(c.name.clone())))
            .from(model.table())
    }

    /// Adds one result expression.
    #[must_use]
    pub fn column(mut self, node: impl Into<Node>) -> Self {
        self.columns.push(node.into());
        self
    }

    /// Adds several result expressions.
    #[must_use]
    pub fn columns(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.columns.extend(nodes);
        self
    }

    /// Sets the source table.
    #[must_use]
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(xpr::table(table));
        self
    }

    /// Selects from the rows of a prepared query.
    #[must_use]
    pub fn from_query(mut self, query: &impl PreparedOperation) -> Self {
        self.from = Some(xpr::statement(query));
        self
    }

    /// Names the source `AS alias`.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Appends a join.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Sets the `WHERE` condition.
    #[must_use]
    pub fn filter(mut self, condition: Node) -> Self {
        self.filter = Some(condition);
        self
    }

    /// Sets the `GROUP BY` terms.
    #[must_use]
    pub fn group_by(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.group_by = nodes.into_iter().collect();
        self
    }

    /// Appends the rows of `query`, dropping duplicates.
    #[must_use]
    pub fn union(mut self, query: &impl PreparedOperation) -> Self {
        self.union = Some(Union {
            command: query.command().to_string(),
            all: false,
        });
        self
    }

    /// Appends the rows of `query`, keeping duplicates.
    #[must_use]
    pub fn union_all(mut self, query: &impl PreparedOperation) -> Self {
        self.union = Some(Union {
            command: query.command().to_string(),
            all: true,
        });
        self
    }

    /// Appends an `ORDER BY` term.
    #[must_use]
    pub fn order_by(mut self, node: Node, order: Order) -> Self {
        self.order_by.push((node, order));
        self
    }

    /// Sets `LIMIT`.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets `OFFSET`.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Renders the statement.
    pub fn prepare(&self, dialect: &dyn Dialect) -> Result<PreparedStatement> {
        let mut sql = String::from("SELECT ");
        {
            let mut compiler = SqlCompiler::new(dialect, &mut sql);
            if self.columns.is_empty() {
                compiler.write_str("*");
            } else {
                write_separated(&mut compiler, &self.columns)?;
            }

            if let Some(from) = &self.from {
                compiler.write_str(" FROM ");
                compiler.visit(from)?;
            }
            if let Some(alias) = &self.alias {
                compiler.write_str(" AS ");
                compiler.write_str(alias);
            }

            for join in &self.joins {
                join.write(&mut compiler)?;
            }

            if let Some(filter) = &self.filter {
                compiler.write_str(" WHERE ");
                compiler.visit(filter)?;
            }

            if !self.group_by.is_empty() {
                compiler.write_str(" GROUP BY ");
                write_separated(&mut compiler, &self.group_by)?;
            }

            if let Some(union) = &self.union {
                compiler.write_str(if union.all { " UNION ALL " } else { " UNION " });
                compiler.write_str(&union.command);
            }

            for (i, (node, order)) in self.order_by.iter().enumerate() {
                compiler.write_str(if i == 0 { " ORDER BY " } else { ", " });
                compiler.visit(node)?;
                if *order == Order::Descending {
                    compiler.write_str(" DESC");
                }
            }
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        Ok(PreparedStatement::new(sql))
    }
}

fn write_separated(compiler: &mut SqlCompiler<'_>, nodes: &[Node]) -> Result<()> {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            compiler.write_str(", ");
        }
        compiler.visit(node)?;
    }
    Ok(())
}
