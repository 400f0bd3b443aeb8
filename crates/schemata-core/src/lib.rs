//! Expression trees compiled to dialect-specific SQL, plus the entity models
//! and schema introspection the migration engine builds on.
//!
//! # Architecture
//!
//! - **Expressions** ([`xpr`]) - immutable node trees built with free
//!   functions; field references are checked against an [`EntityModel`].
//! - **Compiler** ([`compiler`]) - walks a tree and appends SQL text,
//!   delegating every product-specific fragment to the dialect.
//! - **Models** ([`model`]) - entity models declared with the tag
//!   mini-language, and the [`Schema`] descriptors read back from a database.
//! - **Dialects** ([`dialect`]) - quoting, parameters, types, functions, DDL
//!   and catalog access for one database product.
//! - **Statements** ([`statement`]) - thin builders producing
//!   [`PreparedStatement`]s that run on an `sqlx::AnyPool`.
//!
//! # Example
//!
//! ```rust
//! use schemata_core::dialect::SqliteDialect;
//! use schemata_core::statement::Select;
//! use schemata_core::{xpr, EntityModel, PreparedOperation, ValueType};
//!
//! let person = EntityModel::builder("person")
//!     .field("ID", ValueType::Int, "primarykey,autoincrement")
//!     .field("Name", ValueType::Text, "notnull")
//!     .build()
//!     .unwrap();
//!
//! let query = Select::new()
//!     .column(xpr::field(&person, "Name").unwrap())
//!     .from(person.table())
//!     .filter(xpr::equals(xpr::field(&person, "ID").unwrap(), xpr::parameter()))
//!     .prepare(&SqliteDialect::new())
//!     .unwrap();
//!
//! assert_eq!(query.command(), "SELECT [name] FROM person WHERE [id] = ?");
//! ```

pub mod compiler;
pub mod db;
pub mod dialect;
pub mod error;
pub mod model;
pub mod statement;
pub mod value;
pub mod xpr;

pub use compiler::{compile, SqlCompiler};
pub use db::{connect, DatabaseConfig};
pub use dialect::Dialect;
pub use error::{Error, Result};
pub use model::{ColumnDescriptor, EntityModel, IndexDescriptor, Schema};
pub use statement::{PreparedOperation, PreparedStatement};
pub use value::{ToValue, Value, ValueType};
pub use xpr::Node;
