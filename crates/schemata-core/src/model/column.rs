//! Column descriptors.

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::value::ValueType;

/// Metadata for one column of a table, declared or introspected.
///
/// Declared columns carry a [`ValueType`] and an empty `db_type` until they
/// are resolved against a dialect. Introspected columns carry the live type
/// text in `db_type` and no generic type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,
    /// Source field name, when declared through an entity model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Generic type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    /// Part of the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Single-column unique constraint.
    #[serde(default)]
    pub unique: bool,
    /// Auto-increment column.
    #[serde(default)]
    pub auto_increment: bool,
    /// NOT NULL constraint.
    #[serde(default)]
    pub not_null: bool,
    /// Default value, rendered verbatim into DDL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Database type name, empty until resolved.
    #[serde(default)]
    pub db_type: String,
}

impl ColumnDescriptor {
    /// Creates a declared column with a generic type.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            value_type: Some(value_type),
            ..Self::untyped(name)
        }
    }

    /// Creates a column known only by its database type, as read back from
    /// a catalog.
    #[must_use]
    pub fn introspected(name: impl Into<String>, db_type: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
            ..Self::untyped(name)
        }
    }

    fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: None,
            value_type: None,
            primary_key: false,
            unique: false,
            auto_increment: false,
            not_null: false,
            default: None,
            db_type: String::new(),
        }
    }

    /// Records the source field name.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Marks the column as primary key.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as auto-increment.
    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Adds a single-column unique constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Adds a NOT NULL constraint.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets the default value text.
    #[must_use]
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the database type name.
    #[must_use]
    pub fn db_type(mut self, db_type: impl Into<String>) -> Self {
        self.db_type = db_type.into();
        self
    }

    /// The database type this column has under `dialect`.
    ///
    /// An explicit `db_type` wins over the generic type mapping.
    pub fn resolved_type(&self, dialect: &dyn Dialect) -> Result<String> {
        match self.value_type {
            Some(value_type) if self.db_type.is_empty() => dialect.type_name(value_type),
            _ => Ok(self.db_type.clone()),
        }
    }

    /// Returns a copy whose `db_type` is filled in for `dialect`.
    pub fn resolve(&self, dialect: &dyn Dialect) -> Result<Self> {
        let db_type = self.resolved_type(dialect)?;
        Ok(Self {
            db_type,
            ..self.clone()
        })
    }

    /// Whether a row copy into this column needs a synthesized value: it
    /// rejects NULL and the database will not supply one.
    #[must_use]
    pub const fn requires_fill(&self) -> bool {
        self.not_null && !self.auto_increment && self.default.is_none()
    }
}
