use tabula_core::schema::TableMapping;

/// `CREATE TABLE IF NOT EXISTS` for a mapped table.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub table: TableMapping,
}

impl CreateTable {
    pub fn new(table: &TableMapping) -> CreateTable {
        CreateTable {
            table: table.clone(),
        }
    }
}
