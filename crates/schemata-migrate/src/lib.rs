//! Schema reconciliation for entity models.
//!
//! `schemata-migrate` compares a declared [`EntityModel`] with what a live
//! database holds and applies the smallest safe change:
//!
//! - **Diff** ([`diff`]) - missing, altered and obsolete columns plus index
//!   and unique set equality, and the evolution [`Strategy`] they imply.
//! - **Updater** ([`updater`]) - creates missing objects, replaces views,
//!   alters tables in place or rebuilds them while preserving rows.
//! - **Model files** ([`model_file`]) - JSON model declarations used by the
//!   `schemata-migrate` command-line tool.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use schemata_core::dialect::SqliteDialect;
//! use schemata_migrate::prelude::*;
//!
//! # async fn run() -> schemata_migrate::Result<()> {
//! let pool = connect(&DatabaseConfig::new("sqlite:app.db")).await?;
//! let updater = SchemaUpdater::new(pool, Arc::new(SqliteDialect::new()));
//!
//! let person = EntityModel::builder("person")
//!     .field("ID", ValueType::Int, "primarykey,autoincrement")
//!     .field("Name", ValueType::Text, "notnull,default=''")
//!     .build()?;
//!
//! match updater.update_schema(&person).await? {
//!     SchemaUpdate::Created => println!("created"),
//!     other => println!("{other:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`EntityModel`]: schemata_core::EntityModel
//! [`Strategy`]: diff::Strategy

pub mod diff;
pub mod error;
pub mod model_file;
pub mod updater;

pub use error::{MigrateError, Result};

/// Commonly used items.
pub mod prelude {
    pub use crate::diff::{Strategy, TableDiff};
    pub use crate::error::{MigrateError, Result};
    pub use crate::model_file::ModelFile;
    pub use crate::updater::{AdditiveReport, RecreateReport, SchemaUpdate, SchemaUpdater};
    pub use schemata_core::{connect, DatabaseConfig, Dialect, EntityModel, ValueType};
}
