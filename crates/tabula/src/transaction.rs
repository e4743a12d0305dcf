use crate::{db::PoolConnection, Db};

use futures::FutureExt;
use std::{
    collections::HashSet,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, PoisonError},
};
use tabula_core::{Error, Result};
use tabula_sql::Transaction;

impl Db {
    /// Runs `f` inside a transaction.
    ///
    /// `f` receives a handle bound to the transaction's connection. The
    /// transaction commits when `f` returns `Ok`. When `f` returns an error it
    /// is rolled back and the error comes back wrapped in a
    /// "transaction rolled back" error. When `f` panics it is rolled back and
    /// the panic resumes.
    ///
    /// Transactions do not nest: calling this on a bound handle fails.
    pub async fn transaction<T>(&self, f: impl AsyncFnOnce(&Db) -> Result<T>) -> Result<T> {
        if self.in_transaction() {
            return Err(Error::nested_transaction());
        }

        let conn = self.shared.pool.get().await?;
        let tx = Db {
            shared: self.shared.clone(),
            tx: Some(Arc::new(Bound::new(conn))),
            cancel: self.cancel.clone(),
        };

        tx.exec_control(Transaction::Start).await?;
        let mut guard = RollbackOnDrop { db: Some(tx.clone()) };

        let res = AssertUnwindSafe(f(&tx)).catch_unwind().await;

        match res {
            Ok(Ok(value)) => {
                tx.exec_control(Transaction::Commit).await?;
                guard.disarm();
                tx.invalidate_written();
                Ok(value)
            }
            Ok(Err(err)) => {
                guard.disarm();
                tx.rollback().await;
                Err(err.context(Error::transaction_rolled_back()))
            }
            Err(payload) => {
                guard.disarm();
                tx.rollback().await;
                panic::resume_unwind(payload)
            }
        }
    }

    async fn rollback(&self) {
        if let Err(err) = self.exec_control(Transaction::Rollback).await {
            tracing::warn!(%err, "transaction rollback failed");
        }
        self.invalidate_written();
    }

    /// Drops the cached results of every table the transaction wrote to.
    fn invalidate_written(&self) {
        let Some(tx) = &self.tx else {
            return;
        };
        for table in tx.take_written() {
            self.shared.cache.delete_group(&crate::db::cache_group(&table));
        }
    }
}

/// The connection of an open transaction.
pub(crate) struct Bound {
    pub(crate) conn: tokio::sync::Mutex<PoolConnection>,

    /// Tables written since `BEGIN`
    written: Mutex<HashSet<String>>,
}

impl Bound {
    fn new(conn: PoolConnection) -> Bound {
        Bound {
            conn: tokio::sync::Mutex::new(conn),
            written: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn wrote(&self, table: &str) {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if !written.contains(table) {
            written.insert(table.to_string());
        }
    }

    fn take_written(&self) -> HashSet<String> {
        std::mem::take(&mut *self.written.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Rolls back a transaction whose future was dropped before it finished.
struct RollbackOnDrop {
    db: Option<Db>,
}

impl RollbackOnDrop {
    fn disarm(&mut self) {
        self.db = None;
    }
}

impl Drop for RollbackOnDrop {
    fn drop(&mut self) {
        let Some(db) = self.db.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    db.rollback().await;
                });
            }
            Err(_) => {
                tracing::warn!("transaction dropped outside of a runtime; not rolled back");
            }
        }
    }
}
