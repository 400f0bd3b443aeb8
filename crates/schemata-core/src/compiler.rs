//! Expression tree to SQL text.
//!
//! The compiler walks a [`Node`] tree and appends SQL to a caller-owned
//! buffer. It never touches the database; every product-specific fragment
//! is delegated to the [`Dialect`].

use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::{Value, TIMESTAMP_FORMAT};
use crate::xpr::{BinaryNode, BinaryOperator, InCollectionNode, Node, UnaryNode};

/// Renders nodes into an output buffer.
pub struct SqlCompiler<'a> {
    dialect: &'a dyn Dialect,
    out: &'a mut String,
}

impl<'a> SqlCompiler<'a> {
    /// Creates a compiler that appends to `out`.
    pub fn new(dialect: &'a dyn Dialect, out: &'a mut String) -> Self {
        Self { dialect, out }
    }

    /// The dialect in use.
    #[must_use]
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Appends raw text.
    pub fn write_str(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Appends `name(arg,arg,..)`.
    pub fn write_call(&mut self, name: &str, arguments: &[Node]) -> Result<()> {
        self.out.push_str(name);
        self.out.push('(');
        self.visit_list(arguments)?;
        self.out.push(')');
        Ok(())
    }

    /// Appends the nodes separated by commas.
    pub fn visit_list(&mut self, nodes: &[Node]) -> Result<()> {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.visit(node)?;
        }
        Ok(())
    }

    /// Renders one node.
    pub fn visit(&mut self, node: &Node) -> Result<()> {
        let dialect = self.dialect;
        match node {
            Node::Value(value) => {
                self.write_value(value);
                Ok(())
            }
            Node::Unary(unary) => self.visit_unary(unary),
            Node::Binary(binary) => self.visit_binary(binary),
            Node::Function(function) => dialect.write_function(function, self),
            Node::Parameter(parameter) => {
                dialect.write_parameter(parameter, self.out);
                Ok(())
            }
            Node::Field(field) => {
                self.out.push_str(&dialect.mask_identifier(&field.column.name));
                Ok(())
            }
            Node::Column(name) => {
                self.out.push_str(&dialect.mask_identifier(name));
                Ok(())
            }
            Node::Alias(alias) => {
                self.out.push_str(&alias.alias);
                self.out.push('.');
                self.visit(&alias.target)
            }
            Node::InCollection(in_collection) => self.visit_in(in_collection),
            Node::Statement(command) => {
                self.out.push('(');
                self.out.push_str(command);
                self.out.push(')');
                Ok(())
            }
            Node::Table(name) => {
                self.out.push_str(name);
                Ok(())
            }
        }
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.out.push_str("NULL"),
            Value::Bool(b) => self.out.push_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Int(n) => self.out.push_str(&n.to_string()),
            // SQL has no NaN or infinity literal.
            Value::Float(f) if !f.is_finite() => self.out.push_str("NULL"),
            Value::Float(f) => self.out.push_str(&f.to_string()),
            Value::Text(s) => self.dialect.write_string_literal(s, self.out),
            Value::Blob(bytes) => {
                self.out.push_str("X'");
                for byte in bytes {
                    self.out.push_str(&format!("{byte:02X}"));
                }
                self.out.push('\'');
            }
            Value::Timestamp(ts) => {
                self.out.push('\'');
                self.out.push_str(&ts.format(TIMESTAMP_FORMAT).to_string());
                self.out.push('\'');
            }
        }
    }

    fn visit_unary(&mut self, unary: &UnaryNode) -> Result<()> {
        self.out.push_str(unary.operator.symbol());
        // A leading sign on the operand would otherwise fuse with the operator,
        // and `--` starts a comment.
        let group = match unary.operand.as_ref() {
            Node::Binary(_) | Node::Unary(_) => true,
            Node::Value(Value::Int(n)) => *n < 0,
            Node::Value(Value::Float(f)) => f.is_sign_negative() && f.is_finite(),
            _ => false,
        };
        self.visit_grouped(&unary.operand, group)
    }

    fn visit_binary(&mut self, binary: &BinaryNode) -> Result<()> {
        let operator = binary.operator;
        self.visit_operand(&binary.lhs, operator, false)?;

        if binary.rhs.is_null() {
            match operator {
                BinaryOperator::Equals => {
                    self.out.push_str(" IS NULL");
                    return Ok(());
                }
                BinaryOperator::NotEqual => {
                    self.out.push_str(" IS NOT NULL");
                    return Ok(());
                }
                _ => {}
            }
        }

        self.out.push(' ');
        self.out.push_str(operator.symbol());
        self.out.push(' ');
        self.visit_operand(&binary.rhs, operator, true)
    }

    fn visit_operand(&mut self, operand: &Node, parent: BinaryOperator, right: bool) -> Result<()> {
        let group = match operand {
            Node::Binary(child) => {
                let (child_rank, parent_rank) = (child.operator.precedence(), parent.precedence());
                child_rank < parent_rank
                    || (right
                        && child_rank == parent_rank
                        && !(child.operator == parent && parent.is_associative()))
            }
            _ => false,
        };
        self.visit_grouped(operand, group)
    }

    fn visit_grouped(&mut self, node: &Node, group: bool) -> Result<()> {
        if group {
            self.out.push('(');
            self.visit(node)?;
            self.out.push(')');
            Ok(())
        } else {
            self.visit(node)
        }
    }

    fn visit_in(&mut self, node: &InCollectionNode) -> Result<()> {
        self.visit_grouped(&node.item, matches!(*node.item, Node::Binary(_)))?;
        self.out.push_str(" IN (");
        self.visit_list(&node.collection)?;
        self.out.push(')');
        Ok(())
    }
}

/// Compiles a single node into a fresh string.
pub fn compile(dialect: &dyn Dialect, node: &Node) -> Result<String> {
    let mut out = String::new();
    SqlCompiler::new(dialect, &mut out).visit(node)?;
    Ok(out)
}
