mod value;
use value::Value;

use rusqlite::{Connection as RusqliteConnection, InterruptHandle};
use std::{
    fmt, panic,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
};
use tabula_core::{
    async_trait,
    driver::{Capability, Driver, Response},
    stmt::{self, Row},
    Error, Result,
};
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver with an arbitrary connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::driver_operation_failed)?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={}",
                url_str
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn capability(&self) -> &'static Capability {
        &Capability::SQLITE
    }

    async fn connect(&self) -> Result<Box<dyn tabula_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }

    fn max_connections(&self) -> Option<usize> {
        // Every in-memory connection is a separate database
        matches!(self, Self::InMemory).then_some(1)
    }
}

/// A SQLite connection.
///
/// Statements run on Tokio's blocking pool. Dropping an unfinished `exec`
/// future interrupts its statement, which then fails with a cancelled error.
pub struct Connection {
    connection: Arc<Mutex<RusqliteConnection>>,
    interrupt: Arc<InterruptHandle>,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Ok(Self::new(connection))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Ok(Self::new(connection))
    }

    fn new(connection: RusqliteConnection) -> Self {
        Self {
            interrupt: Arc::new(connection.get_interrupt_handle()),
            connection: Arc::new(Mutex::new(connection)),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

#[async_trait]
impl tabula_core::driver::Connection for Connection {
    async fn exec(&mut self, sql: &str, params: &[stmt::Value]) -> Result<Response> {
        tracing::trace!(sql, params = params.len(), "sqlite exec");

        let connection = self.connection.clone();
        let sql = sql.to_string();
        let params = params.to_vec();

        let mut guard = InterruptOnDrop::new(self.interrupt.clone());
        let abandoned = guard.abandoned.clone();

        let res = tokio::task::spawn_blocking(move || {
            let connection = connection.lock().unwrap_or_else(PoisonError::into_inner);
            if abandoned.load(Ordering::Acquire) {
                return Err(Error::cancelled());
            }
            exec_blocking(&connection, &sql, &params)
        })
        .await;
        guard.disarm();

        match res {
            Ok(res) => res,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(err) => Err(Error::driver_operation_failed(err)),
        }
    }
}

fn exec_blocking(
    connection: &RusqliteConnection,
    sql: &str,
    params: &[stmt::Value],
) -> Result<Response> {
    let mut stmt = connection.prepare_cached(sql).map_err(failed)?;

    let params = params.iter().map(Value).collect::<Vec<_>>();

    if stmt.column_count() == 0 {
        let count = stmt
            .execute(rusqlite::params_from_iter(params.iter()))
            .map_err(failed)?;

        let response = Response::count(count as u64);
        return Ok(if sql.starts_with("INSERT") {
            response.with_last_insert_id(connection.last_insert_rowid())
        } else {
            response
        });
    }

    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = columns.len();

    let mut rows = stmt
        .query(rusqlite::params_from_iter(params.iter()))
        .map_err(failed)?;

    let mut ret = vec![];

    while let Some(row) = rows.next().map_err(failed)? {
        let mut values = Vec::with_capacity(width);

        for index in 0..width {
            let value = row.get_ref(index).map_err(failed)?;
            values.push(Value::from_sql(value));
        }

        ret.push(Row::new(columns.clone(), values));
    }

    Ok(Response::values(ret))
}

/// Converts a rusqlite error. An interrupted statement is a cancellation.
fn failed(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::OperationInterrupted =>
        {
            Error::cancelled()
        }
        _ => Error::driver_operation_failed(err),
    }
}

/// Interrupts the running statement unless disarmed first.
struct InterruptOnDrop {
    handle: Option<Arc<InterruptHandle>>,

    /// Set before interrupting, for a statement that has not started yet
    abandoned: Arc<AtomicBool>,
}

impl InterruptOnDrop {
    fn new(handle: Arc<InterruptHandle>) -> Self {
        Self {
            handle: Some(handle),
            abandoned: Arc::new(AtomicBool::new(false)),
        }
    }

    fn disarm(&mut self) {
        self.handle = None;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.abandoned.store(true, Ordering::Release);
            handle.interrupt();
            tracing::debug!("sqlite statement interrupted");
        }
    }
}
