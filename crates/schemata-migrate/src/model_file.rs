//! Entity models stored as JSON.
//!
//! ```json
//! {
//!   "table": "person",
//!   "fields": [
//!     { "name": "ID", "type": "int", "options": "primarykey,autoincrement" },
//!     { "name": "Name", "type": "text", "options": "notnull" }
//!   ]
//! }
//! ```
//!
//! A `view` entry holding a complete `CREATE VIEW` statement turns the model
//! into a view.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use schemata_core::model::FieldSpec;
use schemata_core::EntityModel;

use crate::error::Result;

/// On-disk form of an entity model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Table or view name.
    pub table: String,
    /// Defining statement when the model is a view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    /// Field declarations in column order.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl ModelFile {
    /// Reads and parses a model file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Builds the entity model, validating every field's options.
    pub fn into_model(self) -> Result<EntityModel> {
        let mut builder = EntityModel::builder(self.table).fields(self.fields);
        if let Some(query) = self.view {
            builder = builder.view_query(query);
        }
        Ok(builder.build()?)
    }
}
