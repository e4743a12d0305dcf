use tabula_core::stmt::Value;

/// Multi-row `INSERT`. Every row lists its values in `columns` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,

    /// Column to return from the inserted rows, where the flavor supports it.
    pub returning: Option<String>,
}

impl Insert {
    pub fn new<S: Into<String>>(
        table: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
    ) -> Insert {
        Insert {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: vec![],
            returning: None,
        }
    }

    pub fn row(&mut self, values: Vec<Value>) -> &mut Self {
        self.rows.push(values);
        self
    }

    pub fn returning(&mut self, column: impl Into<String>) -> &mut Self {
        self.returning = Some(column.into());
        self
    }
}
