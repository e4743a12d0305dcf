//! Test support for the integration suites: recording drivers, sample
//! models and database setup.

pub use exec_log::{Exec, ExecLog};

mod logging_driver;
pub use logging_driver::LoggingDriver;

pub use mock_driver::{MockDriver, Reply};

pub mod models;


pub use std_util::*;

use tabula::{Builder, Db};
use tabula_driver_sqlite::Sqlite;

/// Installs a `tracing` subscriber honoring `RUST_LOG`. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An in-memory SQLite database with every sample model registered and
/// migrated. `configure` runs on the builder before it is built.
///
/// The returned log starts out empty.
pub async fn sqlite(configure: impl FnOnce(&mut Builder)) -> (Db, ExecLog) {
    init_tracing();

    let driver = LoggingDriver::new(Sqlite::in_memory());
    let log = driver.log();

    let mut builder = Db::builder();
    models::register_all(&mut builder);
    builder.cache_sweep_interval(None);
    configure(&mut builder);

    let db = builder.build(driver).await.unwrap();
    db.auto_migrate().await.unwrap();
    log.clear();

    (db, log)
}

/// A database over `driver` with every sample model registered. Nothing is
/// migrated.
pub async fn mock(driver: MockDriver, configure: impl FnOnce(&mut Builder)) -> Db {
    init_tracing();

    let mut builder = Db::builder();
    models::register_all(&mut builder);
    builder.cache_sweep_interval(None);
    configure(&mut builder);

    builder.build(driver).await.unwrap()
}
