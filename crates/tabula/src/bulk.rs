//! Chunked bulk writes.
//!
//! Every chunk is its own statement. A failing chunk stops the write; earlier
//! chunks stay written and the error reports which records were not.

use crate::Db;

use tabula_core::{
    schema::TableMapping,
    stmt::{Condition, Value},
    BulkProgress, Error, Result,
};
use tabula_sql::{
    bulk::{chunk_ranges, rows_per_statement},
    stmt::{Delete, Insert},
    Statement,
};

use std::ops::Range;

impl Db {
    /// Inserts `rows`, each holding the insertable fields of `table` in
    /// mapping order. Returns the number of inserted rows.
    pub(crate) async fn bulk_insert(
        &self,
        table: &TableMapping,
        rows: Vec<Vec<Value>>,
        batch_size: usize,
    ) -> Result<u64> {
        let columns: Vec<&str> = table
            .insertable()
            .map(|(_, field)| field.name.as_str())
            .collect();
        let size = rows_per_statement(batch_size, columns.len(), self.capability());

        let mut rows = rows.into_iter();
        self.run_chunks(table.name(), rows.len(), size, |range| {
            let mut insert = Insert::new(table.name(), columns.iter().copied());
            for row in rows.by_ref().take(range.len()) {
                insert.row(row);
            }
            insert.into()
        })
        .await
    }

    /// Deletes the rows whose `column` holds one of `keys`.
    pub(crate) async fn bulk_delete(
        &self,
        table: &TableMapping,
        (column, keys): (String, Vec<Value>),
        batch_size: usize,
    ) -> Result<u64> {
        let size = rows_per_statement(batch_size, 1, self.capability());

        self.run_chunks(table.name(), keys.len(), size, |range| {
            let mut delete = Delete::new(table.name());
            delete.filter(Condition::in_list(&column, keys[range].to_vec()));
            delete.into()
        })
        .await
    }

    /// Partitions `len` records into chunks, then fails: row-level bulk
    /// updates are not implemented.
    pub(crate) async fn bulk_update(
        &self,
        table: &TableMapping,
        len: usize,
        batch_size: usize,
    ) -> Result<u64> {
        let size = rows_per_statement(batch_size, table.fields().len(), self.capability());
        let chunks = chunk_ranges(len, size).count();
        if chunks == 0 {
            return Ok(0);
        }

        Err(Error::not_implemented(format!(
            "bulk update of {len} `{}` record(s) in {chunks} chunk(s)",
            table.name()
        )))
    }

    async fn run_chunks(
        &self,
        table: &str,
        len: usize,
        size: usize,
        mut build: impl FnMut(Range<usize>) -> Statement,
    ) -> Result<u64> {
        let mut written = 0;
        let mut completed = 0;

        for range in chunk_ranges(len, size) {
            let start = range.start;
            let res = self.exec(build(range)).await;

            match res {
                Ok(res) => {
                    written += res.rows.count();
                    completed += 1;
                }
                Err(err) => {
                    tracing::debug!(
                        table,
                        completed_chunks = completed,
                        failed_at = start,
                        "bulk write failed"
                    );
                    return Err(err.context(Error::partial_bulk_failure(BulkProgress {
                        completed_chunks: completed,
                        committed: 0..start,
                        uncommitted: start..len,
                    })));
                }
            }
        }

        tracing::debug!(table, chunks = completed, rows = written, "bulk write");
        Ok(written)
    }
}
