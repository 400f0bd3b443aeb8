//! Differences between an entity model and a live table.

use std::sync::Arc;

use serde::Serialize;

use schemata_core::model::{same_index_set, Table};
use schemata_core::{ColumnDescriptor, Dialect, EntityModel, IndexDescriptor};

use crate::error::Result;

/// How a live table is brought in line with its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// `ALTER TABLE` in place.
    Additive,
    /// Rename, create, copy, drop.
    Recreate,
}

/// Column and index deltas between a model and a live table.
#[derive(Debug, Clone)]
pub struct TableDiff {
    /// Model columns the live table lacks.
    pub missing: Vec<Arc<ColumnDescriptor>>,
    /// Model columns whose live counterpart has another type or other flags.
    pub altered: Vec<Arc<ColumnDescriptor>>,
    /// Live columns the model no longer declares.
    pub obsolete: Vec<String>,
    /// Plain indices cover the same column sets.
    pub indices_equal: bool,
    /// Unique groups cover the same column sets.
    pub uniques_equal: bool,
}

impl TableDiff {
    /// Compares `model` with `live`, resolving model types through `dialect`.
    pub fn compute(model: &EntityModel, live: &Table, dialect: &dyn Dialect) -> Result<Self> {
        let mut missing = Vec::new();
        let mut altered = Vec::new();

        for column in model.columns() {
            match live.column(&column.name) {
                None => missing.push(Arc::clone(column)),
                Some(existing) => {
                    if is_altered(existing, column, dialect)? {
                        altered.push(Arc::clone(column));
                    }
                }
            }
        }

        let obsolete = live
            .columns
            .iter()
            .filter(|c| model.column(&c.name).is_none())
            .map(|c| c.name.clone())
            .collect();

        let indices: Vec<IndexDescriptor> = model.indices().cloned().collect();
        let uniques: Vec<IndexDescriptor> = model.uniques().cloned().collect();

        Ok(Self {
            missing,
            altered,
            obsolete,
            indices_equal: same_index_set(&live.indices, &indices),
            uniques_equal: same_index_set(&live.uniques, &uniques),
        })
    }

    /// Picks the evolution path.
    ///
    /// Anything an `ALTER TABLE .. ADD COLUMN` cannot express forces a
    /// recreate: dropped or changed columns, new key, unique or required
    /// columns, and changed index or unique sets.
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        let keyed_addition = self
            .missing
            .iter()
            .any(|c| c.primary_key || c.unique || c.requires_fill());
        if !self.obsolete.is_empty()
            || !self.altered.is_empty()
            || keyed_addition
            || !self.indices_equal
            || !self.uniques_equal
        {
            Strategy::Recreate
        } else {
            Strategy::Additive
        }
    }

    /// No column or index differences at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
            && self.altered.is_empty()
            && self.obsolete.is_empty()
            && self.indices_equal
            && self.uniques_equal
    }
}

fn is_altered(
    live: &ColumnDescriptor,
    target: &ColumnDescriptor,
    dialect: &dyn Dialect,
) -> Result<bool> {
    let target_type = target.resolved_type(dialect)?;
    Ok(!dialect.types_equivalent(&live.db_type, &target_type)
        || live.primary_key != target.primary_key
        || live.auto_increment != target.auto_increment
        || live.unique != target.unique
        || live.not_null != target.not_null)
}
