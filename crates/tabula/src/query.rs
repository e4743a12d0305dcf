use crate::{
    db::cache_key,
    metrics::{Metric, CACHE_HIT, CACHE_MISS},
    hooks::{HookContext, HookPoint},
    page::{Page, Paginator},
    Db, Model, ModelSchema,
};

use tabula_core::{
    driver::Rows,
    stmt::{Condition, Op, Row, Value},
    Error, Result,
};
use tabula_sql::stmt::{Delete, Insert, Query, Update};

use std::{any::TypeId, marker::PhantomData, sync::Arc, time::Duration};

/// Which rows a query sees with respect to soft deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trashed {
    /// Only rows that are not soft deleted
    #[default]
    Exclude,

    /// Every row
    Include,

    /// Only soft deleted rows
    Only,
}

/// Queries and writes for one model, returned by [`Db::model`].
///
/// Modifiers consume and return the query, terminal operations consume it:
///
/// ```no_run
/// # use tabula::{Db, Model, Result};
/// # use tabula::stmt::Op;
/// # async fn example<User: Model>(db: &Db) -> Result<()> {
/// let adults = db
///     .model::<User>()
///     .filter("age", Op::Ge, 18)
///     .order_by("name", false)
///     .paginate(2, 20)
///     .find_page()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub struct ModelQuery<'a, M> {
    db: &'a Db,
    conditions: Vec<Condition>,
    order_by: Vec<(String, bool)>,
    limit: Option<u64>,
    offset: Option<u64>,
    scopes: Vec<String>,
    unscoped: bool,
    trashed: Trashed,
    paginator: Option<Paginator>,
    preload: Vec<String>,
    cache_ttl: Option<Duration>,
    batch_size: Option<usize>,
    _model: PhantomData<fn() -> M>,
}

impl<'a, M: Model> ModelQuery<'a, M> {
    pub(crate) fn new(db: &'a Db) -> Self {
        ModelQuery {
            db,
            conditions: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
            scopes: vec![],
            unscoped: false,
            trashed: Trashed::Exclude,
            paginator: None,
            preload: vec![],
            cache_ttl: None,
            batch_size: None,
            _model: PhantomData,
        }
    }

    /// Adds `column op value` to the conditions. Conditions are AND-joined.
    pub fn filter(mut self, column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::new(column, op, value));
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, desc: bool) -> Self {
        self.order_by.push((column.into(), desc));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Applies a named scope registered for `M`.
    pub fn scope(mut self, name: impl Into<String>) -> Self {
        self.scopes.push(name.into());
        self
    }

    /// Skips global and default scopes. Named scopes still apply.
    pub fn unscoped(mut self) -> Self {
        self.unscoped = true;
        self
    }

    /// Includes soft deleted rows.
    pub fn with_trashed(mut self) -> Self {
        self.trashed = Trashed::Include;
        self
    }

    /// Only soft deleted rows.
    pub fn only_trashed(mut self) -> Self {
        self.trashed = Trashed::Only;
        self
    }

    /// Fetches one page. Overrides `limit` and `offset`.
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        self.paginator = Some(Paginator::new(page, per_page));
        self
    }

    /// Loads the named relation whether or not it preloads by default.
    pub fn preload(mut self, field: impl Into<String>) -> Self {
        self.preload.push(field.into());
        self
    }

    /// Serves the rows from the cache when possible, caching them for `ttl`
    /// otherwise. Any write to the table drops the cached rows. Handles bound
    /// to a transaction bypass the cache.
    pub fn cached(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Records per statement for bulk writes, in place of the database's
    /// configured batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size.max(1));
        self
    }

    pub async fn find(self) -> Result<Vec<M>> {
        Ok(self.fetch().await?.0)
    }

    /// Like [`find`](Self::find), also reporting the page position.
    /// Without [`paginate`](Self::paginate) the first page of 10 is fetched.
    pub async fn find_page(mut self) -> Result<Page<M>> {
        let default = *self
            .paginator
            .get_or_insert(Paginator::new(1, Paginator::DEFAULT_PER_PAGE));
        let (items, paginator) = self.fetch().await?;
        Ok(Page {
            items,
            info: paginator.unwrap_or(default).info(),
        })
    }

    pub async fn first(self) -> Result<Option<M>> {
        let records = self.limit(1).find().await?;
        Ok(records.into_iter().next())
    }

    /// Like [`first`](Self::first), failing when no record matches.
    pub async fn get(self) -> Result<M> {
        let table = self.schema()?.name().to_string();
        self.first()
            .await?
            .ok_or_else(|| Error::record_not_found(format!("no matching `{table}` record")))
    }

    /// Number of matching records. Ordering and pagination are ignored.
    ///
    /// Query hooks run as for [`find`](Self::find); after-query hooks see the
    /// count as the number of rows.
    pub async fn count(self) -> Result<u64> {
        let schema = self.schema()?;
        let query = self.select(&schema)?.to_count();

        self.hooks(&HookContext::new(HookPoint::BeforeQuery, schema.name()).conditions(&query.conditions))?;
        let total = count(self.db, query).await?;
        self.hooks(&HookContext::new(HookPoint::AfterQuery, schema.name()).rows(total))?;
        Ok(total)
    }

    /// Inserts `record`, then stores the generated key back into it.
    pub async fn create(self, record: &mut M) -> Result<()> {
        let schema = self.schema()?;
        let table = schema.table();

        self.db.shared.validator.validate(&schema, record)?;
        self.hooks(&HookContext::new(HookPoint::BeforeCreate, table.name()).record(&*record))?;

        let columns = table.insertable().map(|(_, field)| field.name.as_str());
        let mut insert = Insert::new(table.name(), columns);
        insert.row(schema.insert_values(record));
        if let Some(field) = table.auto_increment() {
            insert.returning(&field.name);
        }

        let res = self.db.exec(insert).await?;

        if let Some(field) = table.auto_increment() {
            let id = match res.rows {
                Rows::Values(rows) => rows
                    .into_iter()
                    .next()
                    .and_then(|row| row.values().first().cloned()),
                Rows::Count(_) => res.last_insert_id.map(Value::I64),
            };
            if let Some(id) = id {
                schema.set(record, &field.name, id)?;
            }
        }

        self.hooks(
            &HookContext::new(HookPoint::AfterCreate, table.name())
                .record(&*record)
                .rows(1),
        )
    }

    /// Writes every updatable field of `record`, matched by primary key and
    /// any conditions on the query.
    pub async fn update(self, record: &M) -> Result<u64> {
        let schema = self.schema()?;
        let table = schema.table();

        let key = schema.key(record);
        if key.is_empty() {
            return Err(Error::invalid_statement(format!(
                "`{}` has no primary key to update by",
                table.name()
            )));
        }

        self.db.shared.validator.validate(&schema, record)?;

        let mut update = Update::new(table.name());
        for (column, value) in schema.update_values(record) {
            update.set(column, value);
        }
        for (column, value) in key {
            update.filter(Condition::eq(column, value));
        }
        for condition in &self.conditions {
            update.filter(condition.clone());
        }

        self.write_update(update, Some(record)).await
    }

    /// Sets `columns` on every record matching the query's conditions.
    pub async fn update_columns<C, V>(self, columns: impl IntoIterator<Item = (C, V)>) -> Result<u64>
    where
        C: Into<String>,
        V: Into<Value>,
    {
        let schema = self.schema()?;
        self.require_conditions("UPDATE", schema.name())?;

        let mut update = Update::new(schema.name());
        for (column, value) in columns {
            update.set(column, value);
        }
        for condition in &self.conditions {
            update.filter(condition.clone());
        }

        self.write_update(update, None).await
    }

    /// Removes matching records. Models with a soft delete column are soft
    /// deleted; use [`force_delete`](Self::force_delete) to remove the rows.
    pub async fn delete(self) -> Result<u64> {
        let schema = self.schema()?;
        if schema.table().has_column(self.soft_delete_column()) {
            self.soft_delete().await
        } else {
            self.force_delete().await
        }
    }

    /// Deletes matching rows from the table.
    pub async fn force_delete(self) -> Result<u64> {
        let schema = self.schema()?;
        let table = schema.name();
        self.require_conditions("DELETE", table)?;

        self.hooks(&HookContext::new(HookPoint::BeforeDelete, table).conditions(&self.conditions))?;

        let mut delete = Delete::new(table);
        for condition in &self.conditions {
            delete.filter(condition.clone());
        }
        let res = self.db.exec(delete).await?;

        let rows = res.rows.count();
        self.hooks(
            &HookContext::new(HookPoint::AfterDelete, table)
                .conditions(&self.conditions)
                .rows(rows),
        )?;
        Ok(rows)
    }

    /// Stamps matching rows that are not yet soft deleted with the current
    /// time.
    pub async fn soft_delete(self) -> Result<u64> {
        let schema = self.schema()?;
        let table = schema.name();
        let column = self.soft_delete_column();
        self.require_soft_delete(&schema)?;
        self.require_conditions("soft delete", table)?;

        self.hooks(&HookContext::new(HookPoint::BeforeDelete, table).conditions(&self.conditions))?;

        let mut update = Update::new(table);
        update.set(column, chrono::Utc::now());
        for condition in &self.conditions {
            update.filter(condition.clone());
        }
        update.filter(Condition::is_null(column));
        let res = self.db.exec(update).await?;

        let rows = res.rows.count();
        self.hooks(
            &HookContext::new(HookPoint::AfterDelete, table)
                .conditions(&self.conditions)
                .rows(rows),
        )?;
        Ok(rows)
    }

    /// Clears the soft delete mark of matching rows.
    pub async fn restore(self) -> Result<u64> {
        let schema = self.schema()?;
        let table = schema.name();
        let column = self.soft_delete_column();
        self.require_soft_delete(&schema)?;
        self.require_conditions("restore", table)?;

        let mut update = Update::new(table);
        update.set(column, Value::Null);
        for condition in &self.conditions {
            update.filter(condition.clone());
        }
        update.filter(Condition::is_not_null(column));

        self.write_update(update, None).await
    }

    /// Inserts `records` with one multi-row INSERT per batch.
    ///
    /// Keys generated by the database are not read back. Records are
    /// validated up front; no hooks run.
    pub async fn bulk_create(self, records: &[M]) -> Result<u64> {
        let schema = self.schema()?;
        for record in records {
            self.db.shared.validator.validate(&schema, record)?;
        }

        let rows = records
            .iter()
            .map(|record| schema.insert_values(record))
            .collect();
        self.db
            .bulk_insert(schema.table(), rows, self.effective_batch_size())
            .await
    }

    /// Deletes `records` by primary key, one statement per batch.
    pub async fn bulk_delete(self, records: &[M]) -> Result<u64> {
        let schema = self.schema()?;
        let keys = single_key(&schema, records)?;
        self.db
            .bulk_delete(schema.table(), keys, self.effective_batch_size())
            .await
    }

    /// Not implemented beyond partitioning. Fails for any non-empty input.
    pub async fn bulk_update(self, records: &[M]) -> Result<u64> {
        let schema = self.schema()?;
        self.db
            .bulk_update(schema.table(), records.len(), self.effective_batch_size())
            .await
    }

    fn schema(&self) -> Result<Arc<ModelSchema<M>>> {
        self.db.shared.models.schema::<M>()
    }

    fn soft_delete_column(&self) -> &'a str {
        &self.db.shared.config.soft_delete_column
    }

    fn effective_batch_size(&self) -> usize {
        self.batch_size
            .unwrap_or(self.db.shared.config.batch_size)
    }

    fn hooks(&self, cx: &HookContext<'_>) -> Result<()> {
        self.db.shared.hooks.run(TypeId::of::<M>(), cx)
    }

    fn require_conditions(&self, operation: &str, table: &str) -> Result<()> {
        if self.conditions.is_empty() {
            return Err(Error::invalid_statement(format!(
                "{operation} on `{table}` without conditions"
            )));
        }
        Ok(())
    }

    fn require_soft_delete(&self, schema: &ModelSchema<M>) -> Result<()> {
        if !schema.table().has_column(self.soft_delete_column()) {
            return Err(Error::unsupported_operation(
                "soft delete",
                format!(
                    "`{}`, which has no `{}` column",
                    schema.name(),
                    self.soft_delete_column()
                ),
            ));
        }
        Ok(())
    }

    async fn write_update(&self, update: Update, record: Option<&M>) -> Result<u64> {
        let table = update.table.clone();
        let conditions = update.conditions.clone();

        let cx = HookContext::new(HookPoint::BeforeUpdate, &table).conditions(&conditions);
        let cx = match record {
            Some(record) => cx.record(record),
            None => cx,
        };
        self.hooks(&cx)?;

        let res = self.db.exec(update).await?;

        let rows = res.rows.count();
        let cx = HookContext::new(HookPoint::AfterUpdate, &table)
            .conditions(&conditions)
            .rows(rows);
        let cx = match record {
            Some(record) => cx.record(record),
            None => cx,
        };
        self.hooks(&cx)?;
        Ok(rows)
    }

    /// The SELECT for this query: scopes, then explicit conditions, then the
    /// soft delete filter, then ordering and window.
    fn select(&self, schema: &ModelSchema<M>) -> Result<Query> {
        let mut query = Query::new(schema.name());

        if !self.unscoped {
            self.db
                .shared
                .scopes
                .apply_defaults(TypeId::of::<M>(), &mut query);
        }
        for name in &self.scopes {
            self.db
                .shared
                .scopes
                .apply_named(TypeId::of::<M>(), name, &mut query)?;
        }

        for condition in &self.conditions {
            query.condition(condition.clone());
        }

        let column = self.soft_delete_column();
        if schema.table().has_column(column) {
            match self.trashed {
                Trashed::Exclude => {
                    query.condition(Condition::is_null(column));
                }
                Trashed::Only => {
                    query.condition(Condition::is_not_null(column));
                }
                Trashed::Include => {}
            }
        }

        for (column, desc) in &self.order_by {
            query.order_by(column, *desc);
        }
        if let Some(limit) = self.limit {
            query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query.offset(offset);
        }

        Ok(query)
    }

    async fn fetch(self) -> Result<(Vec<M>, Option<Paginator>)> {
        let schema = self.schema()?;
        let mut query = self.select(&schema)?;

        self.hooks(&HookContext::new(HookPoint::BeforeQuery, schema.name()).conditions(&query.conditions))?;

        let mut paginator = self.paginator;
        if let Some(paginator) = &mut paginator {
            let total = count(self.db, query.to_count()).await?;
            paginator.set_total(total);
            query.limit(paginator.limit()).offset(paginator.offset());
        }

        // Uncommitted rows never reach the shared cache
        let ttl = self.cache_ttl.filter(|_| !self.db.in_transaction());
        let rows = match ttl {
            Some(ttl) => self.cached_rows(query, ttl).await?,
            None => self.db.query_rows(query.clone()).await?,
        };

        let mut records = rows
            .into_iter()
            .map(|row| schema.load(row))
            .collect::<Result<Vec<_>>>()?;

        self.db.preload(&mut records, &self.preload).await?;

        self.hooks(
            &HookContext::new(HookPoint::AfterQuery, schema.name())
                .rows(records.len() as u64),
        )?;

        Ok((records, paginator))
    }

    async fn cached_rows(&self, query: Query, ttl: Duration) -> Result<Vec<Row>> {
        let db = self.db;
        let table = query.table.clone();
        let sql = db.serializer().build(&query.into())?;
        let key = cache_key(&table, &sql);

        if let Some(rows) = db.cache().get::<Vec<Row>>(&key) {
            db.record(Metric::counter(CACHE_HIT).label("table", &table));
            return Ok(rows.as_ref().clone());
        }
        db.record(Metric::counter(CACHE_MISS).label("table", &table));

        let rows = db.exec_sql("select", &table, &sql).await?.rows.into_values()?;
        db.cache().set(key, rows.clone(), ttl);
        Ok(rows)
    }
}

async fn count(db: &Db, query: Query) -> Result<u64> {
    let value = db.exec(query).await?.rows.into_scalar()?;
    u64::try_from(value)
}

/// Primary key values of `records`, for models with a single-column key.
fn single_key<M: Model>(schema: &ModelSchema<M>, records: &[M]) -> Result<(String, Vec<Value>)> {
    let mut pk = schema.table().primary_key();
    let column = match (pk.next(), pk.next()) {
        (Some(field), None) => field.name.clone(),
        _ => {
            return Err(Error::unsupported_operation(
                "bulk delete",
                format!("`{}`, which has no single-column primary key", schema.name()),
            ))
        }
    };

    let keys = records
        .iter()
        .filter_map(|record| schema.get(record, &column))
        .collect();
    Ok((column, keys))
}
