//! Database connections.

use serde::{Deserialize, Serialize};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use tracing::info;

use crate::error::{Error, Result};

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL, e.g. `sqlite:app.db` or `sqlite::memory:`.
    pub url: String,
    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

const fn default_max_connections() -> u32 {
    5
}

impl DatabaseConfig {
    /// Settings for `url` with the default pool size.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
        }
    }

    /// Overrides the pool size.
    #[must_use]
    pub const fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }
}

/// Opens a pool for any driver compiled into sqlx.
///
/// In-memory SQLite databases are private to one connection, so pools for
/// them should be limited to a single connection.
pub async fn connect(config: &DatabaseConfig) -> Result<AnyPool> {
    sqlx::any::install_default_drivers();
    info!(max_connections = config.max_connections, "Connecting to database");
    AnyPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| Error::execution(format!("CONNECT {}", config.url), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: DatabaseConfig = serde_json::from_str(r#"{"url":"sqlite::memory:"}"#).unwrap();
        assert_eq!(config, DatabaseConfig::new("sqlite::memory:"));
        assert_eq!(config.max_connections, 5);
    }

    #[tokio::test]
    async fn test_connect_in_memory() {
        let pool = connect(&DatabaseConfig::new("sqlite::memory:").max_connections(1))
            .await
            .unwrap();
        let one: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one.0, 1);
    }
}
