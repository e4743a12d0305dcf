/// Catalog query returning a single boolean: does `table` exist?
#[derive(Debug, Clone, PartialEq)]
pub struct TableExists {
    pub table: String,
}

/// Catalog query returning one row per live column of `table`, with the
/// column name in the first position.
#[derive(Debug, Clone, PartialEq)]
pub struct ListColumns {
    pub table: String,
}

impl TableExists {
    pub fn new(table: impl Into<String>) -> TableExists {
        TableExists {
            table: table.into(),
        }
    }
}

impl ListColumns {
    pub fn new(table: impl Into<String>) -> ListColumns {
        ListColumns {
            table: table.into(),
        }
    }
}
