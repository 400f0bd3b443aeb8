//! Entity models built from field declarations.
//!
//! Each field is declared with a name, a [`ValueType`] and an option string in
//! the tag mini-language:
//!
//! | option            | effect                                        |
//! |-------------------|-----------------------------------------------|
//! | `primarykey`      | column is (part of) the primary key           |
//! | `autoincrement`   | column is auto-increment                      |
//! | `unique`          | single-column unique constraint               |
//! | `notnull`         | NOT NULL constraint                           |
//! | `column=<name>`   | overrides the column name (default: lowercase field name) |
//! | `index=<group>`   | adds the column to the named plain index      |
//! | `unique=<group>`  | adds the column to the named unique group     |
//! | `default=<value>` | default value, rendered verbatim              |
//!
//! ```rust
//! use schemata_core::{EntityModel, ValueType};
//!
//! let model = EntityModel::builder("person")
//!     .field("ID", ValueType::Int, "primarykey,autoincrement")
//!     .field("Firstname", ValueType::Text, "index=name")
//!     .field("Lastname", ValueType::Text, "index=name")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(model.column_from_field("Firstname").unwrap().name, "firstname");
//! assert_eq!(model.index("name").unwrap().columns, ["firstname", "lastname"]);
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{ColumnDescriptor, IndexDescriptor};
use crate::value::ValueType;

/// One field declaration: name, generic type and tag options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Generic type.
    #[serde(rename = "type")]
    pub value_type: ValueType,
    /// Comma separated options.
    #[serde(default)]
    pub options: String,
}

impl FieldSpec {
    /// Creates a field declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType, options: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type,
            options: options.into(),
        }
    }
}

/// Whether a model describes a table or a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A base table created from the declared columns.
    Table,
    /// A view created by running its defining query.
    View {
        /// Complete `CREATE VIEW` statement.
        query: String,
    },
}

/// Structural description of one table or view. Immutable once built.
#[derive(Debug, Clone)]
pub struct EntityModel {
    table: String,
    source: ModelSource,
    fields: IndexMap<String, Arc<ColumnDescriptor>>,
    columns: IndexMap<String, Arc<ColumnDescriptor>>,
    indices: IndexMap<String, IndexDescriptor>,
    uniques: IndexMap<String, IndexDescriptor>,
}

impl EntityModel {
    /// Starts a table model.
    #[must_use]
    pub fn builder(table: impl Into<String>) -> EntityModelBuilder {
        EntityModelBuilder {
            table: table.into(),
            view: None,
            fields: Vec::new(),
        }
    }

    /// Creates a view model from its defining statement.
    #[must_use]
    pub fn view(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            source: ModelSource::View {
                query: query.into(),
            },
            fields: IndexMap::new(),
            columns: IndexMap::new(),
            indices: IndexMap::new(),
            uniques: IndexMap::new(),
        }
    }

    /// Table or view name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Table or view.
    #[must_use]
    pub const fn source(&self) -> &ModelSource {
        &self.source
    }

    /// Returns `true` for view models.
    #[must_use]
    pub const fn is_view(&self) -> bool {
        matches!(self.source, ModelSource::View { .. })
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Arc<ColumnDescriptor>> {
        self.columns.values()
    }

    /// Number of declared columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Looks up a column by column name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Arc<ColumnDescriptor>> {
        self.columns.get(name)
    }

    /// Looks up a column by source field name.
    #[must_use]
    pub fn column_from_field(&self, field: &str) -> Option<&Arc<ColumnDescriptor>> {
        self.fields.get(field)
    }

    /// Like [`Self::column_from_field`] but reports unknown fields.
    pub fn field(&self, field: &str) -> Result<&Arc<ColumnDescriptor>> {
        self.column_from_field(field)
            .ok_or_else(|| Error::UnknownField {
                table: self.table.clone(),
                field: field.to_string(),
            })
    }

    /// Plain indices in declaration order.
    pub fn indices(&self) -> impl Iterator<Item = &IndexDescriptor> {
        self.indices.values()
    }

    /// Looks up a plain index by group name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDescriptor> {
        self.indices.get(name)
    }

    /// Unique groups in declaration order.
    pub fn uniques(&self) -> impl Iterator<Item = &IndexDescriptor> {
        self.uniques.values()
    }

    /// Looks up a unique group by name.
    #[must_use]
    pub fn unique_group(&self, name: &str) -> Option<&IndexDescriptor> {
        self.uniques.get(name)
    }
}

/// Builder for [`EntityModel`].
#[derive(Debug, Clone)]
pub struct EntityModelBuilder {
    table: String,
    view: Option<String>,
    fields: Vec<FieldSpec>,
}

impl EntityModelBuilder {
    /// Declares a field.
    #[must_use]
    pub fn field(
        mut self,
        name: impl Into<String>,
        value_type: ValueType,
        options: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldSpec::new(name, value_type, options));
        self
    }

    /// Declares several fields at once.
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Turns the model into a view created by `query`. Declared fields stay
    /// addressable in expressions.
    #[must_use]
    pub fn view_query(mut self, query: impl Into<String>) -> Self {
        self.view = Some(query.into());
        self
    }

    /// Parses every field's options and freezes the model.
    pub fn build(self) -> Result<EntityModel> {
        let mut fields = IndexMap::new();
        let mut columns = IndexMap::new();
        let mut indices: IndexMap<String, IndexDescriptor> = IndexMap::new();
        let mut uniques: IndexMap<String, IndexDescriptor> = IndexMap::new();

        for spec in &self.fields {
            let parsed = parse_field(spec)?;
            let column = Arc::new(parsed.column);

            if columns.contains_key(&column.name) {
                return Err(Error::DuplicateColumn {
                    table: self.table.clone(),
                    column: column.name.clone(),
                });
            }

            for group in parsed.index_groups {
                add_to_group(&mut indices, group, &column.name);
            }
            for group in parsed.unique_groups {
                add_to_group(&mut uniques, group, &column.name);
            }

            fields.insert(spec.name.clone(), Arc::clone(&column));
            columns.insert(column.name.clone(), column);
        }

        let source = match self.view {
            Some(query) => ModelSource::View { query },
            None => ModelSource::Table,
        };

        Ok(EntityModel {
            table: self.table,
            source,
            fields,
            columns,
            indices,
            uniques,
        })
    }
}

fn add_to_group(groups: &mut IndexMap<String, IndexDescriptor>, group: String, column: &str) {
    groups
        .entry(group.clone())
        .or_insert_with(|| IndexDescriptor::new(group, Vec::<String>::new()))
        .columns
        .push(column.to_string());
}

struct ParsedField {
    column: ColumnDescriptor,
    index_groups: Vec<String>,
    unique_groups: Vec<String>,
}

fn parse_field(spec: &FieldSpec) -> Result<ParsedField> {
    let mut column = ColumnDescriptor::new(spec.name.to_lowercase(), spec.value_type)
        .field(spec.name.clone());
    let mut index_groups = Vec::new();
    let mut unique_groups = Vec::new();

    for option in spec.options.split(',').map(str::trim) {
        if option.is_empty() {
            continue;
        }
        let invalid = || Error::InvalidFieldOption {
            field: spec.name.clone(),
            option: option.to_string(),
        };

        match option.split_once('=') {
            None => match option {
                "primarykey" => column.primary_key = true,
                "autoincrement" => column.auto_increment = true,
                "unique" => column.unique = true,
                "notnull" => column.not_null = true,
                _ => return Err(invalid()),
            },
            Some((key, value)) => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(invalid());
                }
                match key.trim() {
                    "column" => column.name = value.to_string(),
                    "index" => index_groups.push(value.to_string()),
                    "unique" => unique_groups.push(value.to_string()),
                    "default" => column.default = Some(value.to_string()),
                    _ => return Err(invalid()),
                }
            }
        }
    }

    Ok(ParsedField {
        column,
        index_groups,
        unique_groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_entity() -> EntityModel {
        EntityModel::builder("createentity")
            .field("ID", ValueType::Int, "primarykey,autoincrement")
            .field("GUID", ValueType::Text, "unique")
            .field("Firstname", ValueType::Text, "index=name")
            .field("Lastname", ValueType::Text, "index=name")
            .field("Firstsec", ValueType::Text, "unique=secret")
            .field("Secondsec", ValueType::Text, "unique=secret")
            .build()
            .unwrap()
    }

    #[test]
    fn test_tag_parsing() {
        let model = create_entity();

        let keys: Vec<_> = model
            .columns()
            .filter(|c| c.primary_key && c.auto_increment)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(keys, ["id"]);

        let uniques: Vec<_> = model.uniques().collect();
        assert_eq!(uniques.len(), 1);
        assert_eq!(uniques[0].name, "secret");
        assert_eq!(uniques[0].columns, ["firstsec", "secondsec"]);

        assert!(model.column("guid").unwrap().unique);
        assert_eq!(model.index("name").unwrap().columns, ["firstname", "lastname"]);
    }

    #[test]
    fn test_unique_flag_and_group_are_distinct() {
        let model = create_entity();
        assert!(model.unique_group("guid").is_none());
        assert!(!model.column("firstsec").unwrap().unique);
    }

    #[test]
    fn test_index_and_unique_namespaces_are_independent() {
        let model = EntityModel::builder("t")
            .field("A", ValueType::Int, "index=pair,unique=pair")
            .field("B", ValueType::Int, "index=pair")
            .build()
            .unwrap();
        assert_eq!(model.index("pair").unwrap().columns, ["a", "b"]);
        assert_eq!(model.unique_group("pair").unwrap().columns, ["a"]);
    }

    #[test]
    fn test_column_override_applies_to_groups_in_any_order() {
        let model = EntityModel::builder("t")
            .field("Name", ValueType::Text, "index=lookup, column=display_name")
            .build()
            .unwrap();
        assert_eq!(model.index("lookup").unwrap().columns, ["display_name"]);
        assert_eq!(model.field("Name").unwrap().name, "display_name");
        assert!(model.column("name").is_none());
    }

    #[test]
    fn test_default_and_notnull() {
        let model = EntityModel::builder("t")
            .field("Flag", ValueType::Bool, "notnull,default=0")
            .build()
            .unwrap();
        let flag = model.column("flag").unwrap();
        assert!(flag.not_null);
        assert_eq!(flag.default.as_deref(), Some("0"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = EntityModel::builder("t")
            .field("A", ValueType::Int, "")
            .field("B", ValueType::Int, "column=a")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateColumn { ref column, .. } if column == "a"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = EntityModel::builder("t")
            .field("A", ValueType::Int, "primarykey,indexed")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFieldOption { ref option, .. } if option == "indexed"));
    }

    #[test]
    fn test_unknown_field_lookup() {
        let model = create_entity();
        let err = model.field("Missing").unwrap_err();
        assert!(matches!(err, Error::UnknownField { .. }));
    }

    #[test]
    fn test_view_model() {
        let model = EntityModel::view("adults", "CREATE VIEW adults AS SELECT 1");
        assert!(model.is_view());
        assert_eq!(model.column_count(), 0);
    }
}
