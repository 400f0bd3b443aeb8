//! Expression node types.

use std::sync::Arc;

use crate::model::ColumnDescriptor;
use crate::value::{ToValue, Value};

/// One node of an expression tree.
///
/// The set of kinds is closed; the compiler matches on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A literal value.
    Value(Value),
    /// Prefix operator applied to an operand.
    Unary(UnaryNode),
    /// Infix operator applied to two operands.
    Binary(BinaryNode),
    /// Aggregate or scalar function call.
    Function(FunctionNode),
    /// Statement parameter placeholder.
    Parameter(ParameterNode),
    /// Reference to a model field, resolved at construction.
    Field(FieldNode),
    /// Reference to a raw column name.
    Column(String),
    /// Field or column qualified with a table alias.
    Alias(AliasNode),
    /// `item IN (..)` membership test.
    InCollection(InCollectionNode),
    /// Already prepared statement inlined as a sub-query.
    Statement(String),
    /// Reference to a table by name.
    Table(String),
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Logical negation, `!`.
    Not,
    /// Bitwise complement, `~`.
    Complement,
    /// Arithmetic negation, `-`.
    Negate,
}

impl UnaryOperator {
    /// SQL text of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Complement => "~",
            Self::Negate => "-",
        }
    }
}

/// A prefix operator node.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryNode {
    /// Operator.
    pub operator: UnaryOperator,
    /// Operand.
    pub operand: Box<Node>,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
    Equals,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitOr,
    BitXor,
    Like,
    /// Assignment inside `UPDATE .. SET`.
    Assign,
}

impl BinaryOperator {
    /// SQL text of the operator, without surrounding spaces.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Equals | Self::Assign => "=",
            Self::NotEqual => "<>",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Like => "LIKE",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Assign => 0,
            Self::Or => 1,
            Self::And => 2,
            Self::Equals | Self::NotEqual | Self::Like => 3,
            Self::Greater | Self::GreaterEqual | Self::Less | Self::LessEqual => 4,
            Self::ShiftLeft | Self::ShiftRight | Self::BitAnd | Self::BitOr | Self::BitXor => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Mod => 7,
        }
    }

    /// Whether `a op (b op c)` equals `(a op b) op c`.
    #[must_use]
    pub const fn is_associative(self) -> bool {
        matches!(
            self,
            Self::And | Self::Or | Self::Add | Self::Mul | Self::BitAnd | Self::BitOr
        )
    }
}

/// An infix operator node.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryNode {
    /// Operator.
    pub operator: BinaryOperator,
    /// Left operand.
    pub lhs: Box<Node>,
    /// Right operand.
    pub rhs: Box<Node>,
}

/// Functions a dialect may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Count,
    Random,
    Average,
    Sum,
    Max,
    Min,
    Coalesce,
}

impl Function {
    /// Name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Count => "Count",
            Self::Random => "Random",
            Self::Average => "Average",
            Self::Sum => "Sum",
            Self::Max => "Maximum",
            Self::Min => "Minimum",
            Self::Coalesce => "Coalesce",
        }
    }
}

/// A function call node.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    /// Function.
    pub function: Function,
    /// Arguments in call order.
    pub arguments: Vec<Node>,
}

/// Parameter placeholder styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterNode {
    /// Bound by position.
    Positional,
    /// Bound by name.
    Named(String),
    /// Bound by explicit ordinal.
    Indexed(usize),
}

/// A resolved reference to a model field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    /// Table of the owning model.
    pub table: String,
    /// Column the field maps to.
    pub column: Arc<ColumnDescriptor>,
}

/// A qualified reference, `alias.target`.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasNode {
    /// Table alias.
    pub alias: String,
    /// Field or column being qualified.
    pub target: Box<Node>,
}

/// `item IN (collection)`.
#[derive(Debug, Clone, PartialEq)]
pub struct InCollectionNode {
    /// Tested expression.
    pub item: Box<Node>,
    /// Candidate values.
    pub collection: Vec<Node>,
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

macro_rules! node_from_value {
    ($($source:ty),+) => {
        $(
            impl From<$source> for Node {
                fn from(value: $source) -> Self {
                    Self::Value(value.to_value())
                }
            }
        )+
    };
}

node_from_value!(bool, i64, i32, i16, i8, u32, u16, u8, f64, f32, String, &str, Vec<u8>);
node_from_value!(chrono::NaiveDateTime);

impl<T: ToValue> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        Self::Value(value.to_value())
    }
}

impl Node {
    /// Returns `true` when this node is the NULL literal.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}
