//! schemata-migrate CLI
//!
//! Command-line tool for inspecting live schemas and reconciling them with
//! JSON entity models.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use schemata_core::dialect::{SqlServerDialect, SqliteDialect};
use schemata_migrate::prelude::*;

/// Reconciles entity models with live database schemas.
#[derive(Parser)]
#[command(name = "schemata-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
    database: String,

    /// Upper bound on pooled connections.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// SQL dialect spoken by the database.
    #[arg(long, value_enum, default_value_t = DialectKind::Sqlite)]
    dialect: DialectKind,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectKind {
    Sqlite,
    Sqlserver,
}

impl DialectKind {
    fn dialect(self) -> Arc<dyn Dialect> {
        match self {
            Self::Sqlite => Arc::new(SqliteDialect::new()),
            Self::Sqlserver => Arc::new(SqlServerDialect::new()),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the live schema of one object, or of all of them, as JSON.
    Inspect {
        /// Table or view name (all if not specified).
        name: Option<String>,
    },

    /// Report whether a table or view exists.
    Exists {
        /// Table or view name.
        name: String,
    },

    /// Bring the database in line with a JSON model file.
    Update {
        /// Path to the model file.
        model: PathBuf,
    },

    /// Put the backup left by an interrupted rebuild back in place.
    Restore {
        /// Table whose backup should be restored.
        name: String,
    },

    /// Drop the backup left by an interrupted rebuild.
    DiscardBackup {
        /// Table whose backup should be dropped.
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = DatabaseConfig::new(&cli.database).max_connections(cli.max_connections);
    let pool = connect(&config).await?;
    let dialect = cli.dialect.dialect();

    match cli.command {
        Commands::Inspect { name: Some(name) } => {
            let schema = dialect.read_schema(&pool, &name).await?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }

        Commands::Inspect { name: None } => {
            let schemas = dialect.read_all_schemas(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }

        Commands::Exists { name } => {
            let exists = dialect.table_or_view_exists(&pool, &name).await?;
            println!("{exists}");
        }

        Commands::Update { model } => {
            let model = ModelFile::load(&model)?.into_model()?;
            info!(table = %model.table(), "Updating schema");

            let updater = SchemaUpdater::new(pool, dialect);
            let outcome = updater.update_schema(&model).await?;
            if outcome.is_noop() {
                info!("Schema already up to date.");
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Restore { name } => {
            SchemaUpdater::new(pool, dialect).restore_backup(&name).await?;
            info!(table = %name, "Backup restored.");
        }

        Commands::DiscardBackup { name } => {
            SchemaUpdater::new(pool, dialect).discard_backup(&name).await?;
            info!(table = %name, "Backup discarded.");
        }
    }

    Ok(())
}
