//! Additive schema reconciliation.
//!
//! Tables are created when missing and mapped fields are added as columns.
//! Nothing is ever dropped or altered. Every executed DDL statement is
//! recorded in the `tabula_migrations` audit table.

use crate::Db;

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tabula_core::{schema::TableMapping, stmt::Row, Error, Result};
use tabula_sql::{
    applied_migrations, migrations_table,
    stmt::{CreateIndex, ListColumns, TableExists},
    MigrationStatement, MIGRATIONS_TABLE,
};

/// One row of the audit table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: i64,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub applied: bool,
}

impl Migration {
    fn from_row(row: Row) -> Result<Migration> {
        let mut values = row.into_entries();
        let mut next = |column: &str| {
            values.next().map(|(_, value)| value).ok_or_else(|| {
                Error::schema_introspection(MIGRATIONS_TABLE, format!("missing `{column}`"))
            })
        };

        Ok(Migration {
            id: next("id")?.try_into()?,
            name: next("name")?.try_into()?,
            timestamp: next("timestamp")?.try_into()?,
            applied: next("applied")?.try_into()?,
        })
    }
}

/// Applies schema changes through a [`Db`].
///
/// Reconciliations from one process never overlap. Against other processes,
/// a table or column that turns out to exist already counts as created.
#[derive(Debug)]
pub struct Migrator<'a> {
    db: &'a Db,
}

impl Db {
    pub fn migrator(&self) -> Migrator<'_> {
        Migrator { db: self }
    }

    /// Reconciles every registered model, in registration order. Returns the
    /// audit names of the executed statements.
    pub async fn auto_migrate(&self) -> Result<Vec<String>> {
        let migrator = self.migrator();
        let _lock = self.shared.migrate_lock.lock().await;

        migrator.ensure_catalog().await?;

        let mut applied = vec![];
        for table in self.shared.models.tables() {
            applied.extend(migrator.reconcile(table).await?);
        }

        tracing::debug!(statements = applied.len(), "schema reconciled");
        Ok(applied)
    }
}

impl Migrator<'_> {
    /// Reconciles one table. Returns the audit names of the executed
    /// statements; an up to date table executes none.
    pub async fn migrate(&self, table: &TableMapping) -> Result<Vec<String>> {
        let _lock = self.db.shared.migrate_lock.lock().await;
        self.ensure_catalog().await?;
        self.reconcile(table).await
    }

    /// Creates an index and records it.
    pub async fn create_index(&self, index: CreateIndex) -> Result<()> {
        let _lock = self.db.shared.migrate_lock.lock().await;
        self.ensure_catalog().await?;
        self.apply(&MigrationStatement::create_index(index)).await?;
        Ok(())
    }

    /// Recorded migrations, oldest first.
    pub async fn applied(&self) -> Result<Vec<Migration>> {
        self.db
            .query_rows(applied_migrations())
            .await?
            .into_iter()
            .map(Migration::from_row)
            .collect()
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let value = self
            .db
            .exec(TableExists::new(table))
            .await
            .and_then(|res| res.rows.into_scalar())
            .map_err(|err| {
                err.context(Error::schema_introspection(table, "table lookup failed"))
            })?;
        value.try_into()
    }

    /// Names of the live columns of `table`.
    pub async fn columns(&self, table: &str) -> Result<HashSet<String>> {
        let rows = self
            .db
            .exec(ListColumns::new(table))
            .await
            .and_then(|res| res.rows.into_values())
            .map_err(|err| {
                err.context(Error::schema_introspection(table, "column lookup failed"))
            })?;

        rows.into_iter()
            .map(|row| match row.values().first() {
                Some(value) => value.clone().try_into(),
                None => Err(Error::schema_introspection(table, "column row is empty")),
            })
            .collect()
    }

    async fn ensure_catalog(&self) -> Result<()> {
        if !self.table_exists(MIGRATIONS_TABLE).await? {
            let catalog = migrations_table()?;
            self.execute(&MigrationStatement::create_table(&catalog)).await?;
        }
        Ok(())
    }

    async fn reconcile(&self, table: &TableMapping) -> Result<Vec<String>> {
        let statements = if self.table_exists(table.name()).await? {
            let live = self.columns(table.name()).await?;
            MigrationStatement::add_missing_columns(table, &live)
        } else {
            vec![MigrationStatement::create_table(table)]
        };

        let mut applied = vec![];
        for statement in &statements {
            if self.apply(statement).await? {
                applied.push(statement.name().to_string());
            }
        }
        Ok(applied)
    }

    /// Executes `statement` and records it. Returns `false` when the object
    /// already existed, in which case nothing is recorded.
    async fn apply(&self, statement: &MigrationStatement) -> Result<bool> {
        if !self.execute(statement).await? {
            return Ok(false);
        }
        self.db.exec(statement.record(Utc::now())).await?;
        Ok(true)
    }

    async fn execute(&self, statement: &MigrationStatement) -> Result<bool> {
        let sql = self.db.serializer().build(statement.statement())?;
        tracing::info!(
            migration = statement.name(),
            db.statement = %sql.text,
            "applying migration"
        );

        let res = self
            .db
            .exec_sql(statement.statement().kind(), statement.statement().table(), &sql)
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(err) => {
                let err = self.db.serializer().classify_ddl_error(err, &statement.object());
                if err.is_already_exists() {
                    tracing::warn!(
                        migration = statement.name(),
                        %err,
                        "schema object already exists; skipping"
                    );
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }
}
