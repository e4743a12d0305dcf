//! A small ORM over SQL databases.
//!
//! Models describe their table with an explicit accessor table ([`Model`]).
//! A [`Db`], built once at startup, owns everything registered against it
//! and hands out [`ModelQuery`] handles for reads and writes.

mod bulk;

pub mod cache;
pub use cache::Cache;

pub mod db;
pub use db::{Builder, Db, PoolConfig, PoolStatus};

pub mod hooks;
pub use hooks::{HookContext, HookPoint};

pub mod metrics;
pub use metrics::{Collector, Metric, MetricKind, MetricsSink, NoopSink};

mod migrate;
pub use migrate::{Migration, Migrator};

mod model;
pub use model::{Model, ModelSchema, ModelSchemaBuilder};

pub mod page;
pub use page::{Page, PageInfo, Paginator};

mod query;
pub use query::{ModelQuery, Trashed};

mod relation;

mod scope;

mod transaction;

mod validate;
pub use validate::Rule;

pub use tabula_core::{driver, schema, BulkProgress, Error, Result};
pub use tabula_sql::{stmt, Flavor, Serializer, Sql, Statement};
pub use tokio_util::sync::CancellationToken;
