use crate::{stmt::Row, Error, Result};

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,

    /// Identifier generated by the last INSERT, when the backend reports one.
    pub last_insert_id: Option<i64>,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Rows returned by the operation
    Values(Vec<Row>),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
            last_insert_id: None,
        }
    }

    pub fn values(rows: Vec<Row>) -> Self {
        Self {
            rows: Rows::Values(rows),
            last_insert_id: None,
        }
    }

    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Some(id);
        self
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    /// Number of affected rows, or the number of returned rows.
    pub fn count(&self) -> u64 {
        match self {
            Rows::Count(count) => *count,
            Rows::Values(rows) => rows.len() as u64,
        }
    }

    pub fn into_values(self) -> Result<Vec<Row>> {
        match self {
            Self::Values(rows) => Ok(rows),
            Self::Count(_) => Err(crate::err!(
                "expected rows from the database, got an affected-row count"
            )),
        }
    }

    /// Returns the first column of the first row, for scalar queries.
    pub fn into_scalar(self) -> Result<crate::stmt::Value> {
        let rows = self.into_values()?;
        rows.into_iter()
            .next()
            .and_then(|row| row.values().first().cloned())
            .ok_or_else(|| Error::record_not_found("scalar query returned no rows".to_string()))
    }
}
