//! Plain values and their generic type tags.
//!
//! A [`Value`] is a valid leaf of an expression tree and the argument type of
//! prepared statements. [`ValueType`] is the dialect independent type tag an
//! entity model column carries until a dialect maps it to a database type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used when a timestamp is rendered or bound as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generic type of a model column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Booleans.
    Bool,
    /// Signed and unsigned integers of any width.
    Int,
    /// Floating point numbers.
    Float,
    /// Character data.
    Text,
    /// Byte sequences.
    Blob,
    /// Date and time without zone.
    Timestamp,
}

/// A SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Timestamp value, second precision when rendered.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the generic type of this value, `None` for NULL.
    #[must_use]
    pub const fn value_type(&self) -> Option<ValueType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(ValueType::Bool),
            Self::Int(_) => Some(ValueType::Int),
            Self::Float(_) => Some(ValueType::Float),
            Self::Text(_) => Some(ValueType::Text),
            Self::Blob(_) => Some(ValueType::Blob),
            Self::Timestamp(_) => Some(ValueType::Timestamp),
        }
    }

    /// Returns the integer payload, if any.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToValue {
    /// Converts the value to a [`Value`].
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

macro_rules! to_value_via {
    ($variant:ident, $target:ty: $($source:ty),+) => {
        $(
            impl ToValue for $source {
                fn to_value(self) -> Value {
                    Value::$variant(<$target>::from(self))
                }
            }
        )+
    };
}

to_value_via!(Bool, bool: bool);
to_value_via!(Int, i64: i64, i32, i16, i8, u32, u16, u8);
to_value_via!(Float, f64: f64, f32);
to_value_via!(Text, String: String, &str);
to_value_via!(Blob, Vec<u8>: Vec<u8>, &[u8]);
to_value_via!(Timestamp, NaiveDateTime: NaiveDateTime);

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        self.map_or(Value::Null, ToValue::to_value)
    }
}
