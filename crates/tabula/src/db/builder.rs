use super::{Config, Connect, Db, Pool, PoolConfig, Shared};
use crate::{
    cache::Cache,
    hooks::{HookContext, HookPoint, Hooks},
    metrics::{MetricsSink, NoopSink},
    model::Registry,
    relation::{RelationLoader, Relations},
    scope::Scopes,
    validate::{Rule, Validator},
    Model, Result,
};

use tabula_core::{
    driver::Driver,
    schema::{Relation, RelationKind},
    Error,
};
use tabula_sql::{stmt::Query, Serializer};

use std::{any::TypeId, sync::Arc, time::Duration};

type RegisterFn = fn(&mut Registry) -> Result<()>;

type RelationFn = Box<dyn FnOnce(&mut Relations) -> Result<()> + Send>;

/// Configures and opens a [`Db`].
///
/// Everything registered here is fixed once the database is built.
pub struct Builder {
    models: Vec<RegisterFn>,
    pool: PoolConfig,
    batch_size: usize,
    soft_delete_column: String,
    cache_sweep_interval: Option<Duration>,
    metrics: Arc<dyn MetricsSink>,
    scopes: Scopes,
    hooks: Hooks,
    rules: Vec<(TypeId, String, Rule)>,
    relations: Vec<RelationFn>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder {
            models: vec![],
            pool: PoolConfig::default(),
            batch_size: super::DEFAULT_BATCH_SIZE,
            soft_delete_column: super::DEFAULT_SOFT_DELETE_COLUMN.to_string(),
            cache_sweep_interval: Some(super::DEFAULT_CACHE_SWEEP_INTERVAL),
            metrics: Arc::new(NoopSink),
            scopes: Scopes::default(),
            hooks: Hooks::default(),
            rules: vec![],
            relations: vec![],
        }
    }
}

impl Builder {
    pub fn register<M: Model>(&mut self) -> &mut Self {
        self.models.push(Registry::insert::<M>);
        self
    }

    pub fn pool(&mut self, config: PoolConfig) -> &mut Self {
        self.pool = config;
        self
    }

    /// Records per statement for bulk writes. Defaults to 1000.
    pub fn batch_size(&mut self, batch_size: usize) -> &mut Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Column marking soft deleted rows. Defaults to `deleted_at`.
    pub fn soft_delete_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.soft_delete_column = column.into();
        self
    }

    /// How often expired cache entries are swept. `None` disables the
    /// sweeper; expired entries are then only dropped when read.
    pub fn cache_sweep_interval(&mut self, interval: impl Into<Option<Duration>>) -> &mut Self {
        self.cache_sweep_interval = interval.into();
        self
    }

    pub fn metrics(&mut self, sink: Arc<dyn MetricsSink>) -> &mut Self {
        self.metrics = sink;
        self
    }

    /// A scope applied to the finds of every model.
    pub fn global_scope(
        &mut self,
        name: impl Into<String>,
        scope: impl Fn(&mut Query) + Send + Sync + 'static,
    ) -> &mut Self {
        self.scopes.add_global(name.into(), Arc::new(scope));
        self
    }

    /// A scope applied to every find of `M`.
    pub fn scope<M: Model>(
        &mut self,
        name: impl Into<String>,
        scope: impl Fn(&mut Query) + Send + Sync + 'static,
    ) -> &mut Self {
        self.scopes
            .add_default(TypeId::of::<M>(), name.into(), Arc::new(scope));
        self
    }

    /// A scope `M`'s queries can opt into by name.
    pub fn named_scope<M: Model>(
        &mut self,
        name: impl Into<String>,
        scope: impl Fn(&mut Query) + Send + Sync + 'static,
    ) -> &mut Self {
        self.scopes
            .add_named(TypeId::of::<M>(), name.into(), Arc::new(scope));
        self
    }

    /// A hook run at `point` for every model.
    pub fn hook(
        &mut self,
        point: HookPoint,
        hook: impl Fn(&HookContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks.add(point, None, Arc::new(hook));
        self
    }

    /// A hook run at `point` for `M` only.
    pub fn model_hook<M: Model>(
        &mut self,
        point: HookPoint,
        hook: impl Fn(&HookContext<'_>) -> Result<()> + Send + Sync + 'static,
    ) -> &mut Self {
        self.hooks
            .add(point, Some(TypeId::of::<M>()), Arc::new(hook));
        self
    }

    /// A validation rule on one of `M`'s fields.
    pub fn rule<M: Model>(&mut self, field: impl Into<String>, rule: Rule) -> &mut Self {
        self.rules.push((TypeId::of::<M>(), field.into(), rule));
        self
    }

    /// `O` has at most one `T`, whose `foreign_key` holds `O`'s reference key.
    pub fn has_one<O: Model, T: Model>(
        &mut self,
        relation: Relation,
        attach: fn(&mut O, Option<T>),
    ) -> &mut Self {
        self.relation(RelationKind::OneToOne, relation, move |owner, targets: Vec<T>| {
            attach(owner, targets.into_iter().next())
        })
    }

    /// `O` has many `T`, whose `foreign_key` holds `O`'s reference key.
    pub fn has_many<O: Model, T: Model>(
        &mut self,
        relation: Relation,
        attach: fn(&mut O, Vec<T>),
    ) -> &mut Self {
        self.relation(RelationKind::OneToMany, relation, attach)
    }

    /// `O` and `T` are linked through the relation's join table.
    pub fn many_to_many<O: Model, T: Model>(
        &mut self,
        relation: Relation,
        attach: fn(&mut O, Vec<T>),
    ) -> &mut Self {
        self.relation(RelationKind::ManyToMany, relation, attach)
    }

    fn relation<O: Model, T: Model>(
        &mut self,
        kind: RelationKind,
        relation: Relation,
        attach: impl Fn(&mut O, Vec<T>) + Send + Sync + 'static,
    ) -> &mut Self {
        self.relations.push(Box::new(move |relations: &mut Relations| {
            if relation.kind != kind {
                return Err(Error::invalid_mapping(
                    std::any::type_name::<O>(),
                    format!(
                        "relation `{}` is {:?}, registered as {kind:?}",
                        relation.field, relation.kind
                    ),
                ));
            }
            relations.add(RelationLoader::<O>::new::<T>(relation, attach))
        }));
        self
    }

    /// Opens a pool over `driver` and checks every registration.
    pub async fn build(&mut self, driver: impl Driver) -> Result<Db> {
        let mut models = Registry::default();
        for register in std::mem::take(&mut self.models) {
            register(&mut models)?;
        }

        let mut validator = Validator::new()?;
        for (model, field, rule) in std::mem::take(&mut self.rules) {
            let Some(table) = models.table_of(model) else {
                return Err(tabula_core::err!(
                    "rule `{}` on `{field}` belongs to a model that is not registered",
                    rule.name()
                ));
            };
            if !table.has_column(&field) {
                return Err(Error::invalid_mapping(
                    table.name(),
                    format!("rule `{}` names unknown field `{field}`", rule.name()),
                ));
            }
            validator.add(model, field, rule);
        }

        let mut relations = Relations::default();
        for relation in std::mem::take(&mut self.relations) {
            relation(&mut relations)?;
        }
        relations.check(&models)?;

        let pool = Pool::new(driver, self.pool.clone()).await?;
        let serializer = Serializer::new(pool.capability().flavor);

        let cache = Cache::new();
        if let Some(interval) = self.cache_sweep_interval {
            cache.spawn_sweeper(interval);
        }

        tracing::debug!(
            flavor = %serializer.flavor(),
            models = ?models,
            "database opened"
        );

        Ok(Db {
            shared: Arc::new(Shared {
                pool,
                serializer,
                models,
                scopes: std::mem::take(&mut self.scopes),
                hooks: std::mem::take(&mut self.hooks),
                validator,
                relations,
                cache,
                metrics: self.metrics.clone(),
                config: Config {
                    batch_size: self.batch_size,
                    soft_delete_column: self.soft_delete_column.clone(),
                },
                migrate_lock: tokio::sync::Mutex::new(()),
            }),
            tx: None,
            cancel: None,
        })
    }

    /// Opens the database at `url`. The scheme selects the driver.
    pub async fn connect(&mut self, url: &str) -> Result<Db> {
        self.build(Connect::new(url)?).await
    }
}
