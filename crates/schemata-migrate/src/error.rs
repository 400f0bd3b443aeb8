//! Error types for schema reconciliation.

/// Errors that can occur while bringing a database in line with a model.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Compilation, introspection or execution failed.
    #[error(transparent)]
    Core(#[from] schemata_core::Error),

    /// A transaction could not be opened or finished.
    #[error("Failed to {action} transaction: {source}")]
    Transaction {
        /// `begin`, `commit` or `rollback`.
        action: &'static str,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The live object cannot be turned into what the model declares.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A backup left by an interrupted rebuild is still present.
    #[error(
        "Backup table '{backup}' of '{table}' is left from an interrupted rebuild; restore or discard it first"
    )]
    PendingBackup {
        /// Table being rebuilt.
        table: String,
        /// Leftover backup table.
        backup: String,
    },

    /// There is no backup to restore or discard.
    #[error("No backup table '{0}'")]
    NoBackup(String),

    /// IO error (reading model files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

impl MigrateError {
    pub(crate) fn transaction(action: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Transaction { action, source }
    }
}
