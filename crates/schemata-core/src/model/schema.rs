//! Introspected schema descriptors.

use serde::{Deserialize, Serialize};

use crate::model::{ColumnDescriptor, IndexDescriptor};

/// A table or view as it currently exists in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Schema {
    /// A base table.
    Table(Table),
    /// A view.
    View(View),
}

impl Schema {
    /// Name of the table or view.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Table(table) => &table.name,
            Self::View(view) => &view.name,
        }
    }

    /// Catalog kind, `"table"` or `"view"`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::View(_) => "view",
        }
    }
}

/// Live table structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    /// Columns in definition order.
    pub columns: Vec<ColumnDescriptor>,
    /// Plain indices.
    #[serde(default)]
    pub indices: Vec<IndexDescriptor>,
    /// Table-level unique groups.
    #[serde(default)]
    pub uniques: Vec<IndexDescriptor>,
}

impl Table {
    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a plain index by group name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indices.iter().find(|i| i.name == name)
    }
}

/// Live view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// View name.
    pub name: String,
    /// Defining statement as stored by the database.
    pub sql: String,
}
