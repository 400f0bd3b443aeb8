//! Expression trees.
//!
//! Trees are assembled with the free functions in this module and rendered by
//! [`crate::compiler::SqlCompiler`]. Anything convertible into a [`Value`]
//! is accepted where an operand is expected.
//!
//! ```rust
//! use schemata_core::dialect::SqliteDialect;
//! use schemata_core::{compile, xpr};
//!
//! let node = xpr::equals(xpr::parameter(), "teststring");
//! assert_eq!(compile(&SqliteDialect::new(), &node).unwrap(), "? = 'teststring'");
//! ```

mod node;

use std::sync::Arc;

pub use node::{
    AliasNode, BinaryNode, BinaryOperator, FieldNode, Function, FunctionNode, InCollectionNode,
    Node, ParameterNode, UnaryNode, UnaryOperator,
};

use crate::error::{Error, Result};
use crate::model::EntityModel;
use crate::statement::PreparedOperation;
use crate::value::Value;

/// Builds a binary node.
pub fn binary(lhs: impl Into<Node>, operator: BinaryOperator, rhs: impl Into<Node>) -> Node {
    Node::Binary(BinaryNode {
        operator,
        lhs: Box::new(lhs.into()),
        rhs: Box::new(rhs.into()),
    })
}

macro_rules! binary_builders {
    ($($(#[$meta:meta])* $name:ident => $operator:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            pub fn $name(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
                binary(lhs, BinaryOperator::$operator, rhs)
            }
        )+
    };
}

binary_builders! {
    /// `lhs AND rhs`
    and => And,
    /// `lhs OR rhs`
    or => Or,
    /// `lhs = rhs`, or `lhs IS NULL` when `rhs` is NULL.
    equals => Equals,
    /// `lhs <> rhs`, or `lhs IS NOT NULL` when `rhs` is NULL.
    not_equal => NotEqual,
    /// `lhs > rhs`
    greater => Greater,
    /// `lhs >= rhs`
    greater_equal => GreaterEqual,
    /// `lhs < rhs`
    less => Less,
    /// `lhs <= rhs`
    less_equal => LessEqual,
    /// `lhs + rhs`
    add => Add,
    /// `lhs - rhs`
    sub => Sub,
    /// `lhs * rhs`
    mul => Mul,
    /// `lhs / rhs`
    div => Div,
    /// `lhs % rhs`
    modulo => Mod,
    /// `lhs << rhs`
    shift_left => ShiftLeft,
    /// `lhs >> rhs`
    shift_right => ShiftRight,
    /// `lhs & rhs`
    bit_and => BitAnd,
    /// `lhs | rhs`
    bit_or => BitOr,
    /// `lhs ^ rhs`
    bit_xor => BitXor,
    /// `lhs LIKE rhs`
    like => Like,
    /// `lhs = rhs` in an assignment list.
    assign => Assign,
}

fn unary(operator: UnaryOperator, operand: impl Into<Node>) -> Node {
    Node::Unary(UnaryNode {
        operator,
        operand: Box::new(operand.into()),
    })
}

/// `!operand`
pub fn not(operand: impl Into<Node>) -> Node {
    unary(UnaryOperator::Not, operand)
}

/// `~operand`
pub fn complement(operand: impl Into<Node>) -> Node {
    unary(UnaryOperator::Complement, operand)
}

/// `-operand`
pub fn negate(operand: impl Into<Node>) -> Node {
    unary(UnaryOperator::Negate, operand)
}

/// Calls `function` with arbitrary arguments. Arity is checked by the
/// dialect at render time.
pub fn function(function: Function, arguments: impl IntoIterator<Item = Node>) -> Node {
    Node::Function(FunctionNode {
        function,
        arguments: arguments.into_iter().collect(),
    })
}

/// `COUNT(*)`
#[must_use]
pub fn count() -> Node {
    function(Function::Count, Vec::new())
}

/// Random number.
#[must_use]
pub fn random() -> Node {
    function(Function::Random, Vec::new())
}

/// `AVG(operand)`
pub fn average(operand: impl Into<Node>) -> Node {
    function(Function::Average, [operand.into()])
}

/// `SUM(operand)`
pub fn sum(operand: impl Into<Node>) -> Node {
    function(Function::Sum, [operand.into()])
}

/// `MAX(operand)`
pub fn max(operand: impl Into<Node>) -> Node {
    function(Function::Max, [operand.into()])
}

/// `MIN(operand)`
pub fn min(operand: impl Into<Node>) -> Node {
    function(Function::Min, [operand.into()])
}

/// `COALESCE(a, b, ..)`
pub fn coalesce<I>(operands: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    function(Function::Coalesce, operands.into_iter().map(Into::into))
}

/// Positional parameter.
#[must_use]
pub const fn parameter() -> Node {
    Node::Parameter(ParameterNode::Positional)
}

/// Named parameter.
pub fn named_parameter(name: impl Into<String>) -> Node {
    Node::Parameter(ParameterNode::Named(name.into()))
}

/// Parameter bound by ordinal.
#[must_use]
pub const fn indexed_parameter(index: usize) -> Node {
    Node::Parameter(ParameterNode::Indexed(index))
}

/// The NULL literal.
#[must_use]
pub const fn null() -> Node {
    Node::Value(Value::Null)
}

/// A literal value.
pub fn value(value: impl Into<Node>) -> Node {
    value.into()
}

/// Reference to a model field. Fails when the model has no such field.
pub fn field(model: &EntityModel, name: &str) -> Result<Node> {
    let column = model.field(name)?;
    Ok(Node::Field(FieldNode {
        table: model.table().to_string(),
        column: Arc::clone(column),
    }))
}

/// Reference to a model column by column name. Fails when the model has no
/// such column.
pub fn model_column(model: &EntityModel, name: &str) -> Result<Node> {
    let column = model.column(name).ok_or_else(|| Error::UnknownColumn {
        table: model.table().to_string(),
        column: name.to_string(),
    })?;
    Ok(Node::Field(FieldNode {
        table: model.table().to_string(),
        column: Arc::clone(column),
    }))
}

/// Reference to a raw column name, unchecked.
pub fn column(name: impl Into<String>) -> Node {
    Node::Column(name.into())
}

/// Qualifies a field or column node with a table alias.
pub fn alias(alias: impl Into<String>, target: Node) -> Node {
    Node::Alias(AliasNode {
        alias: alias.into(),
        target: Box::new(target),
    })
}

/// `alias.field` for a model field.
pub fn alias_field(alias_name: impl Into<String>, model: &EntityModel, name: &str) -> Result<Node> {
    Ok(alias(alias_name, field(model, name)?))
}

/// `item IN (a,b,..)`
pub fn in_collection<I>(item: impl Into<Node>, collection: I) -> Node
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    Node::InCollection(InCollectionNode {
        item: Box::new(item.into()),
        collection: collection.into_iter().map(Into::into).collect(),
    })
}

/// Inlines a prepared statement as a parenthesized sub-query.
pub fn statement(prepared: &impl PreparedOperation) -> Node {
    Node::Statement(prepared.command().to_string())
}

/// Reference to a table by name.
pub fn table(name: impl Into<String>) -> Node {
    Node::Table(name.into())
}
