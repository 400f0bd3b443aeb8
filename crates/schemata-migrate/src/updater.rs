//! Brings the live schema of one entity in line with its model.
//!
//! The updater reads the live object through the dialect, diffs it against
//! the model and then either alters the table in place or rebuilds it:
//!
//! 1. missing object: create table and indices, or run the view query;
//! 2. live view: drop it and create from the model;
//! 3. live table: additive `ALTER TABLE` in one transaction, or a recreate
//!    that renames the table to `<table>_original`, creates the new table,
//!    copies the rows across and drops the backup.
//!
//! A rebuild that fails after the rename drops the half-built table and
//! renames the backup back. If even that fails the backup stays behind, and
//! every later update of the table refuses to run until it is restored with
//! [`SchemaUpdater::restore_backup`] or dropped with
//! [`SchemaUpdater::discard_backup`].
//!
//! Callers must not run two updates for the same table concurrently.

use std::sync::Arc;

use serde::Serialize;
use sqlx::{AnyConnection, AnyPool};
use tracing::{debug, info, warn};

use schemata_core::model::{ModelSource, Schema, Table};
use schemata_core::statement::{Insert, Select};
use schemata_core::{xpr, Dialect, EntityModel, Node, PreparedStatement};

use crate::diff::{Strategy, TableDiff};
use crate::error::{MigrateError, Result};

/// Suffix of the backup table used while a table is recreated.
pub const BACKUP_SUFFIX: &str = "_original";

/// What an update did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum SchemaUpdate {
    /// The object did not exist and was created.
    Created,
    /// A live view was dropped and the model created in its place.
    ViewReplaced,
    /// The table was altered in place.
    Additive(AdditiveReport),
    /// The table was rebuilt and its rows copied.
    Recreated(RecreateReport),
}

impl SchemaUpdate {
    /// Returns `true` when nothing had to change.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Additive(report) if report.is_empty())
    }
}

/// Changes applied by an in-place update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdditiveReport {
    /// Columns added with `ADD COLUMN`.
    pub added_columns: Vec<String>,
    /// Unique groups added to the table.
    pub added_uniques: Vec<String>,
    /// Indices dropped because the model no longer names them.
    pub dropped_indices: Vec<String>,
    /// Indices created or rebuilt.
    pub created_indices: Vec<String>,
}

impl AdditiveReport {
    /// Returns `true` when no statement was needed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_columns.is_empty()
            && self.added_uniques.is_empty()
            && self.dropped_indices.is_empty()
            && self.created_indices.is_empty()
    }
}

/// Outcome of a table rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecreateReport {
    /// Columns copied from the old table.
    pub copied_columns: Vec<String>,
    /// New NOT NULL columns populated with a neutral value.
    pub filled_columns: Vec<String>,
    /// Old columns left behind.
    pub dropped_columns: Vec<String>,
    /// Rows copied into the new table.
    pub rows_copied: u64,
}

/// Reconciles entity models with a database.
pub struct SchemaUpdater {
    pool: AnyPool,
    dialect: Arc<dyn Dialect>,
}

impl SchemaUpdater {
    /// Creates an updater for `pool` speaking `dialect`.
    pub fn new(pool: AnyPool, dialect: Arc<dyn Dialect>) -> Self {
        Self { pool, dialect }
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Brings the object named by `model` in line with it.
    pub async fn update_schema(&self, model: &EntityModel) -> Result<SchemaUpdate> {
        let name = model.table();

        let backup = backup_name(name);
        if self.dialect.table_or_view_exists(&self.pool, &backup).await? {
            return Err(MigrateError::PendingBackup {
                table: name.to_string(),
                backup,
            });
        }

        if !self.dialect.table_or_view_exists(&self.pool, name).await? {
            info!(table = %name, "Creating missing schema object");
            self.create(model).await?;
            return Ok(SchemaUpdate::Created);
        }

        match self.dialect.read_schema(&self.pool, name).await? {
            Schema::View(view) => {
                info!(view = %view.name, "Replacing view");
                self.run(&self.dialect.drop_view_sql(&view.name)?).await?;
                self.create(model).await?;
                Ok(SchemaUpdate::ViewReplaced)
            }
            Schema::Table(live) => {
                if model.is_view() {
                    return Err(MigrateError::SchemaMismatch(format!(
                        "'{name}' is a table but the model declares a view"
                    )));
                }
                self.update_table(model, &live).await
            }
        }
    }

    /// Creates the model's table and indices, or runs its view query.
    pub async fn create(&self, model: &EntityModel) -> Result<()> {
        match model.source() {
            ModelSource::View { query } => self.run(query).await,
            ModelSource::Table => {
                self.run(&self.dialect.create_table_sql(model)?).await?;
                for index in model.indices() {
                    for sql in self.dialect.create_index_sql(model.table(), index)? {
                        self.run(&sql).await?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Puts the backup of `table` back in its place, dropping whatever
    /// half-built table holds the name.
    ///
    /// Indices dropped during the rebuild are not recreated here; the next
    /// update adds the ones the model names.
    pub async fn restore_backup(&self, table: &str) -> Result<()> {
        let backup = self.existing_backup(table).await?;
        if self.dialect.table_or_view_exists(&self.pool, table).await? {
            warn!(table = %table, "Dropping partially rebuilt table");
            self.run(&self.dialect.drop_table_sql(table)?).await?;
        }
        info!(table = %table, backup = %backup, "Restoring backup");
        self.run(&self.dialect.rename_table_sql(&backup, table)?).await
    }

    /// Drops the backup of `table`, keeping the table as it is.
    pub async fn discard_backup(&self, table: &str) -> Result<()> {
        let backup = self.existing_backup(table).await?;
        info!(backup = %backup, "Discarding backup");
        self.run(&self.dialect.drop_table_sql(&backup)?).await
    }

    async fn existing_backup(&self, table: &str) -> Result<String> {
        let backup = backup_name(table);
        if self.dialect.table_or_view_exists(&self.pool, &backup).await? {
            Ok(backup)
        } else {
            Err(MigrateError::NoBackup(backup))
        }
    }

    async fn update_table(&self, model: &EntityModel, live: &Table) -> Result<SchemaUpdate> {
        let diff = TableDiff::compute(model, live, self.dialect.as_ref())?;
        let strategy = diff.strategy();
        info!(
            table = %model.table(),
            ?strategy,
            missing = diff.missing.len(),
            altered = diff.altered.len(),
            obsolete = diff.obsolete.len(),
            "Updating table"
        );

        match strategy {
            Strategy::Additive => Ok(SchemaUpdate::Additive(
                self.alter_in_place(model, live, &diff).await?,
            )),
            Strategy::Recreate => Ok(SchemaUpdate::Recreated(
                self.recreate(model, live, &diff).await?,
            )),
        }
    }

    async fn alter_in_place(
        &self,
        model: &EntityModel,
        live: &Table,
        diff: &TableDiff,
    ) -> Result<AdditiveReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(MigrateError::transaction("begin"))?;

        match self.additive_steps(&mut tx, model, live, diff).await {
            Ok(report) => {
                tx.commit().await.map_err(MigrateError::transaction("commit"))?;
                Ok(report)
            }
            Err(e) => {
                warn!(table = %model.table(), error = %e, "Rolling back in-place update");
                tx.rollback()
                    .await
                    .map_err(MigrateError::transaction("rollback"))?;
                Err(e)
            }
        }
    }

    async fn additive_steps(
        &self,
        conn: &mut AnyConnection,
        model: &EntityModel,
        live: &Table,
        diff: &TableDiff,
    ) -> Result<AdditiveReport> {
        let dialect = self.dialect.as_ref();
        let table = model.table();
        let mut report = AdditiveReport::default();

        for column in &diff.missing {
            run_on(conn, &dialect.add_column_sql(table, column)?).await?;
            report.added_columns.push(column.name.clone());
        }

        for unique in model.uniques() {
            if !live.uniques.contains(unique) {
                run_on(conn, &dialect.add_unique_sql(table, unique)?).await?;
                report.added_uniques.push(unique.name.clone());
            }
        }

        for index in &live.indices {
            if model.index(&index.name).is_none() {
                run_on(conn, &dialect.drop_index_sql(table, &index.name)?).await?;
                report.dropped_indices.push(index.name.clone());
            }
        }

        for index in model.indices() {
            if live.index(&index.name) == Some(index) {
                continue;
            }
            for sql in dialect.create_index_sql(table, index)? {
                run_on(conn, &sql).await?;
            }
            report.created_indices.push(index.name.clone());
        }

        Ok(report)
    }

    async fn recreate(
        &self,
        model: &EntityModel,
        live: &Table,
        diff: &TableDiff,
    ) -> Result<RecreateReport> {
        let dialect = self.dialect.as_ref();
        let table = model.table();
        let backup = backup_name(table);

        info!(table = %table, backup = %backup, "Recreating table");
        self.run(&dialect.rename_table_sql(table, &backup)?).await?;

        match self.rebuild(model, live, diff, &backup).await {
            Ok(report) => {
                self.run(&dialect.drop_table_sql(&backup)?).await?;
                Ok(report)
            }
            Err(e) => {
                warn!(table = %table, error = %e, "Rebuild failed, restoring original table");
                if let Err(restore) = self.restore_original(table, live).await {
                    warn!(table = %table, error = %restore, "Failed to restore original table");
                }
                Err(e)
            }
        }
    }

    async fn rebuild(
        &self,
        model: &EntityModel,
        live: &Table,
        diff: &TableDiff,
        backup: &str,
    ) -> Result<RecreateReport> {
        let dialect = self.dialect.as_ref();
        let table = model.table();
        self.create(model).await?;

        let mut report = RecreateReport {
            dropped_columns: diff.obsolete.clone(),
            ..RecreateReport::default()
        };
        let mut targets = Vec::new();
        let mut sources = Vec::new();

        for column in model.columns() {
            let source = match live.column(&column.name) {
                Some(previous) if column.requires_fill() && !previous.not_null => {
                    report.copied_columns.push(column.name.clone());
                    xpr::coalesce([
                        xpr::column(column.name.clone()),
                        Node::Value(dialect.fill_value(column.value_type)),
                    ])
                }
                Some(_) => {
                    report.copied_columns.push(column.name.clone());
                    xpr::column(column.name.clone())
                }
                None if column.requires_fill() => {
                    report.filled_columns.push(column.name.clone());
                    Node::Value(dialect.fill_value(column.value_type))
                }
                None => continue,
            };
            targets.push(column.name.clone());
            sources.push(source);
        }

        if !targets.is_empty() {
            let select = Select::new().columns(sources).from(backup).prepare(dialect)?;
            let insert = Insert::table(table).select(targets, &select).prepare(dialect)?;

            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(MigrateError::transaction("begin"))?;
            match insert.execute(&mut *tx, &[]).await {
                Ok(rows) => {
                    tx.commit().await.map_err(MigrateError::transaction("commit"))?;
                    report.rows_copied = rows;
                }
                Err(e) => {
                    tx.rollback()
                        .await
                        .map_err(MigrateError::transaction("rollback"))?;
                    return Err(e.into());
                }
            }
        }
        debug!(rows = report.rows_copied, "Copied rows into recreated table");
        Ok(report)
    }

    /// Undoes a failed rebuild: the backup takes the table's name again and
    /// gets back the indices it had before the rename.
    async fn restore_original(&self, table: &str, live: &Table) -> Result<()> {
        self.restore_backup(table).await?;
        for index in &live.indices {
            for sql in self.dialect.create_index_sql(table, index)? {
                self.run(&sql).await?;
            }
        }
        Ok(())
    }

    async fn run(&self, sql: &str) -> Result<()> {
        PreparedStatement::new(sql).execute(&self.pool, &[]).await?;
        Ok(())
    }
}

fn backup_name(table: &str) -> String {
    format!("{table}{BACKUP_SUFFIX}")
}

async fn run_on(conn: &mut AnyConnection, sql: &str) -> Result<()> {
    PreparedStatement::new(sql).execute(conn, &[]).await?;
    Ok(())
}
