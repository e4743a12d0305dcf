/// `ALTER TABLE .. DROP COLUMN ..`
///
/// Not every flavor supports it; serializing for SQLite returns an
/// unsupported operation error.
#[derive(Debug, Clone, PartialEq)]
pub struct DropColumn {
    pub table: String,
    pub column: String,
}

impl DropColumn {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> DropColumn {
        DropColumn {
            table: table.into(),
            column: column.into(),
        }
    }
}
