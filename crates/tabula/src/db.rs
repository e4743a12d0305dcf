mod builder;
mod connect;
mod pool;

pub use builder::Builder;
pub use connect::*;
pub use pool::*;

use crate::{
    cache::Cache,
    hooks::Hooks,
    metrics::{self, Metric, MetricsSink},
    model::Registry,
    relation::Relations,
    scope::Scopes,
    transaction::Bound,
    validate::Validator,
    Model, ModelQuery,
};

use tabula_core::{
    driver::{Capability, Flavor, Response},
    stmt::Row,
    Error, Result,
};
use tabula_sql::{stmt::Query, Serializer, Sql, Statement, Transaction};
use tokio_util::sync::CancellationToken;

use std::{fmt, sync::Arc, time::Duration, time::Instant};

/// Settings fixed when the [`Db`] is built.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    /// Records per statement for bulk writes
    pub(crate) batch_size: usize,

    /// Column marking a row as soft deleted
    pub(crate) soft_delete_column: String,
}

/// Shared state between all `Db` clones.
pub(crate) struct Shared {
    pub(crate) pool: Pool,
    pub(crate) serializer: Serializer,
    pub(crate) models: Registry,
    pub(crate) scopes: Scopes,
    pub(crate) hooks: Hooks,
    pub(crate) validator: Validator,
    pub(crate) relations: Relations,
    pub(crate) cache: Cache,
    pub(crate) metrics: Arc<dyn MetricsSink>,
    pub(crate) config: Config,

    /// Held for the whole of a schema reconciliation
    pub(crate) migrate_lock: tokio::sync::Mutex<()>,
}

/// A database handle.
///
/// Cloning is cheap; clones share the pool, the registries and the cache.
/// A handle bound to a transaction runs every statement on that
/// transaction's connection. A handle with a cancellation token gives up on
/// any statement once the token is cancelled.
#[derive(Clone)]
pub struct Db {
    pub(crate) shared: Arc<Shared>,
    pub(crate) tx: Option<Arc<Bound>>,
    pub(crate) cancel: Option<CancellationToken>,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Queries and writes records of `M`.
    pub fn model<M: Model>(&self) -> ModelQuery<'_, M> {
        ModelQuery::new(self)
    }

    /// A handle whose statements race `token`.
    ///
    /// Once the token is cancelled, pending and future statements return a
    /// cancelled error. A transaction opened from the handle is still rolled
    /// back.
    pub fn with_cancellation(&self, token: CancellationToken) -> Db {
        Db {
            shared: self.shared.clone(),
            tx: self.tx.clone(),
            cancel: Some(token),
        }
    }

    /// Returns `true` if this handle is bound to an open transaction.
    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    pub fn capability(&self) -> &'static Capability {
        self.shared.pool.capability()
    }

    pub fn flavor(&self) -> Flavor {
        self.shared.serializer.flavor()
    }

    pub fn serializer(&self) -> &Serializer {
        &self.shared.serializer
    }

    pub fn cache(&self) -> &Cache {
        &self.shared.cache
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.shared.pool.status()
    }

    /// Mapping of a registered model.
    pub fn table<M: Model>(&self) -> Result<Arc<tabula_core::schema::TableMapping>> {
        Ok(self.shared.models.schema::<M>()?.table().clone())
    }

    /// Executes one statement.
    ///
    /// A statement that changes the table drops the table's cached results
    /// once it succeeds.
    pub async fn exec(&self, stmt: impl Into<Statement>) -> Result<Response> {
        let stmt = stmt.into();
        let sql = self.shared.serializer.build(&stmt)?;
        let res = self.exec_sql(stmt.kind(), stmt.table(), &sql).await?;

        if !matches!(
            stmt,
            Statement::Query(_) | Statement::TableExists(_) | Statement::ListColumns(_)
        ) {
            self.invalidate(stmt.table());
        }
        Ok(res)
    }

    /// Rows returned by `query`.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<Row>> {
        self.exec(query).await?.rows.into_values()
    }

    pub(crate) async fn exec_sql(&self, kind: &str, table: &str, sql: &Sql) -> Result<Response> {
        tracing::debug!(
            db.system = %self.flavor(),
            db.statement = %sql.text,
            params = sql.params.len(),
            "exec"
        );

        let start = Instant::now();
        let res = self.run(&sql.text, &sql.params).await;
        let elapsed = start.elapsed();

        self.record(
            Metric::histogram(metrics::QUERY_EXECUTION, elapsed.as_secs_f64())
                .label("type", kind)
                .label("table", table),
        );

        res.inspect_err(|err| {
            self.record(
                Metric::counter(metrics::ERROR_COUNT)
                    .label("type", kind)
                    .label("table", table),
            );
            tracing::debug!(db.statement = %sql.text, %err, "statement failed");
        })
    }

    /// Runs a transaction control statement. Control statements ignore the
    /// cancellation token, so a cancelled transaction can still roll back.
    pub(crate) async fn exec_control(&self, op: Transaction) -> Result<()> {
        let sql = self.shared.serializer.serialize_transaction(op);
        tracing::debug!(db.system = %self.flavor(), db.statement = sql, "exec");

        let Some(tx) = &self.tx else {
            return Err(tabula_core::err!("`{sql}` outside of a transaction"));
        };
        tx.conn
            .lock()
            .await
            .exec(sql, &[])
            .await
            .map_err(|err| err.context(Error::execution(sql)))?;
        Ok(())
    }

    async fn run(&self, sql: &str, params: &[tabula_core::stmt::Value]) -> Result<Response> {
        let exec = async {
            let res = match &self.tx {
                Some(tx) => tx.conn.lock().await.exec(sql, params).await,
                None => {
                    let mut conn = self.shared.pool.get().await?;
                    self.record_connection_usage();
                    conn.exec(sql, params).await
                }
            };
            res.map_err(|err| err.context(Error::execution(sql)))
        };

        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(db.statement = sql, "statement cancelled");
                    Err(Error::cancelled())
                }
                res = exec => res,
            },
            None => exec.await,
        }
    }

    pub(crate) fn record(&self, metric: Metric) {
        self.shared.metrics.record(metric);
    }

    fn record_connection_usage(&self) {
        let status = self.shared.pool.status();
        let in_use = status.size.saturating_sub(status.available);
        self.record(Metric::gauge(metrics::CONNECTION_USAGE, in_use as f64));
    }

    /// Drops every cached result of `table`.
    ///
    /// Inside a transaction the table is dropped again when the transaction
    /// ends, so results cached by other handles before the commit or rollback
    /// do not outlive it.
    pub(crate) fn invalidate(&self, table: &str) {
        self.shared.cache.delete_group(&cache_group(table));
        if let Some(tx) = &self.tx {
            tx.wrote(table);
        }
    }
}

/// Cache key under which every cached result of `table` is grouped.
pub(crate) fn cache_group(table: &str) -> String {
    format!("table:{table}")
}

/// Cache key of one query's result.
pub(crate) fn cache_key(table: &str, sql: &Sql) -> String {
    format!("{}|{}|{:?}", cache_group(table), sql.text, sql.params)
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db")
            .field("flavor", &self.flavor())
            .field("models", &self.shared.models)
            .field("in_transaction", &self.in_transaction())
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}

pub(crate) const DEFAULT_BATCH_SIZE: usize = 1_000;

pub(crate) const DEFAULT_SOFT_DELETE_COLUMN: &str = "deleted_at";

pub(crate) const DEFAULT_CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
