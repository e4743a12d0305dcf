use crate::{Exec, ExecLog};

use tabula_core::{
    async_trait,
    driver::{Capability, Connection, Driver, Response},
    stmt::Value,
    Result,
};

/// Wraps a driver and logs every statement its connections execute.
#[derive(Debug)]
pub struct LoggingDriver {
    inner: Box<dyn Driver>,
    log: ExecLog,
}

impl LoggingDriver {
    pub fn new(driver: impl Driver) -> Self {
        Self {
            inner: Box::new(driver),
            log: ExecLog::default(),
        }
    }

    /// A handle to the log, shared with every connection.
    pub fn log(&self) -> ExecLog {
        self.log.clone()
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(LoggingConnection {
            inner: self.inner.connect().await?,
            log: self.log.clone(),
        }))
    }

    fn max_connections(&self) -> Option<usize> {
        self.inner.max_connections()
    }
}

#[derive(Debug)]
struct LoggingConnection {
    inner: Box<dyn Connection>,
    log: ExecLog,
}

#[async_trait]
impl Connection for LoggingConnection {
    async fn exec(&mut self, sql: &str, params: &[Value]) -> Result<Response> {
        let res = self.inner.exec(sql, params).await;

        self.log.push(Exec {
            sql: sql.to_string(),
            params: params.to_vec(),
            ok: res.is_ok(),
        });

        res
    }
}
