//! Entity models and schema descriptors.
//!
//! An [`EntityModel`] is what the application declares; a [`Schema`] is what
//! a dialect reads back from a live database. Both speak in
//! [`ColumnDescriptor`]s and [`IndexDescriptor`]s so they can be compared.

mod column;
mod entity;
mod index;
mod schema;

pub use column::ColumnDescriptor;
pub use entity::{EntityModel, EntityModelBuilder, FieldSpec, ModelSource};
pub use index::{IndexDescriptor, same_index_set};
pub use schema::{Schema, Table, View};
