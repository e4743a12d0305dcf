use tabula_core::schema::FieldMapping;

/// `ALTER TABLE .. ADD COLUMN ..`
#[derive(Debug, Clone, PartialEq)]
pub struct AddColumn {
    pub table: String,
    pub column: FieldMapping,
}

impl AddColumn {
    pub fn new(table: impl Into<String>, column: FieldMapping) -> AddColumn {
        AddColumn {
            table: table.into(),
            column,
        }
    }
}
