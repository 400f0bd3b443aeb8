//! Error types shared by the compiler, the entity model and the dialects.

/// Errors raised while building expression trees, compiling them, or talking
/// to the database through a dialect.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field name that the entity model does not declare.
    #[error("Unknown field '{field}' on model '{table}'")]
    UnknownField {
        /// Table of the model that was searched.
        table: String,
        /// Field that was requested.
        field: String,
    },

    /// A column name that the entity model does not declare.
    #[error("Unknown column '{column}' on model '{table}'")]
    UnknownColumn {
        /// Table of the model that was searched.
        table: String,
        /// Column that was requested.
        column: String,
    },

    /// A field option outside the tag mini-language.
    #[error("Invalid option '{option}' on field '{field}'")]
    InvalidFieldOption {
        /// Field carrying the option.
        field: String,
        /// The offending option text.
        option: String,
    },

    /// Two fields resolved to the same column name.
    #[error("Duplicate column '{column}' on model '{table}'")]
    DuplicateColumn {
        /// Table of the model being built.
        table: String,
        /// Column declared twice.
        column: String,
    },

    /// The dialect does not know how to render this function.
    #[error("Function {function} is not supported by the {dialect} dialect")]
    UnsupportedFunction {
        /// Dialect name.
        dialect: &'static str,
        /// Function name.
        function: &'static str,
    },

    /// A function received the wrong number of arguments.
    #[error("Function {function} expects {expected} argument(s), got {actual}")]
    FunctionArity {
        /// Function name.
        function: &'static str,
        /// Human readable arity, e.g. "exactly 1".
        expected: &'static str,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// A dialect member that has no implementation yet.
    #[error("{operation} is not implemented for the {dialect} dialect")]
    NotImplemented {
        /// Dialect name.
        dialect: &'static str,
        /// Operation that was invoked.
        operation: &'static str,
    },

    /// A command failed in the database.
    #[error("Failed to execute '{command}': {source}")]
    Execution {
        /// The SQL text that was sent.
        command: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The result set does not have the expected width.
    #[error("Expected {expected} result column(s), got {actual}")]
    UnexpectedColumnCount {
        /// Expected column count.
        expected: usize,
        /// Column count returned by the statement.
        actual: usize,
    },

    /// A scalar query returned nothing.
    #[error("No result rows were returned by the statement")]
    NoRows,

    /// A result value could not be mapped onto [`crate::Value`].
    #[error("Cannot decode result column {index}: {source}")]
    Decode {
        /// Zero-based column index.
        index: usize,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// A stored definition did not match the catalog grammar.
    #[error("Cannot parse schema definition: {definition}")]
    SchemaParse {
        /// The stored DDL text.
        definition: String,
    },

    /// A catalog entry that is neither a table nor a view.
    #[error("Unsupported schema type '{kind}' for '{name}'")]
    UnsupportedSchemaType {
        /// Object name.
        name: String,
        /// Catalog type reported by the database.
        kind: String,
    },

    /// Nothing in the catalog carries that name.
    #[error("Schema '{0}' not found")]
    SchemaNotFound(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wraps a driver error together with the command that caused it.
    pub fn execution(command: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Execution {
            command: command.into(),
            source,
        }
    }
}
