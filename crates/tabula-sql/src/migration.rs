use crate::stmt::{self, Statement};

use std::collections::HashSet;
use tabula_core::{
    schema::{DataType, FieldMapping, TableMapping},
    stmt::Value,
    Result,
};

/// Name of the audit table recording executed schema changes.
pub const MIGRATIONS_TABLE: &str = "tabula_migrations";

/// Mapping of the audit table. Rows are `(id, name, timestamp, applied)`.
pub fn migrations_table() -> Result<TableMapping> {
    TableMapping::new(
        MIGRATIONS_TABLE,
        vec![
            FieldMapping::new("id", DataType::Integer)
                .primary_key()
                .auto_increment(),
            FieldMapping::new("name", DataType::Text).size(255),
            FieldMapping::new("timestamp", DataType::DateTime),
            FieldMapping::new("applied", DataType::Boolean),
        ],
    )
}

/// A schema change together with the name it is audited under.
#[derive(Debug, Clone)]
pub struct MigrationStatement {
    statement: Statement,
    name: String,
}

impl MigrationStatement {
    pub fn create_table(table: &TableMapping) -> MigrationStatement {
        MigrationStatement {
            statement: stmt::CreateTable::new(table).into(),
            name: format!("create_table_{}", table.name()),
        }
    }

    /// One ADD COLUMN per mapped field missing from `live`, in mapping order.
    ///
    /// Live columns without a field are left alone.
    pub fn add_missing_columns(
        table: &TableMapping,
        live: &HashSet<String>,
    ) -> Vec<MigrationStatement> {
        table
            .missing_from(live)
            .map(|field| MigrationStatement {
                statement: stmt::AddColumn::new(table.name(), field.clone()).into(),
                name: format!("add_column_{}_{}", table.name(), field.name),
            })
            .collect()
    }

    pub fn create_index(index: stmt::CreateIndex) -> MigrationStatement {
        let name = format!("create_index_{}", index.name);
        MigrationStatement {
            statement: index.into(),
            name,
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human readable name of the object this statement creates.
    pub fn object(&self) -> String {
        match &self.statement {
            Statement::CreateTable(stmt) => format!("table `{}`", stmt.table.name()),
            Statement::AddColumn(stmt) => {
                format!("column `{}.{}`", stmt.table, stmt.column.name)
            }
            Statement::CreateIndex(stmt) => format!("index `{}`", stmt.name),
            _ => self.name.clone(),
        }
    }

    /// The audit row recording this statement.
    pub fn record(&self, timestamp: impl Into<Value>) -> stmt::Insert {
        let mut insert = stmt::Insert::new(MIGRATIONS_TABLE, ["name", "timestamp", "applied"]);
        insert.row(vec![
            Value::from(self.name.as_str()),
            timestamp.into(),
            Value::Bool(true),
        ]);
        insert
    }
}

/// Query listing audit rows, oldest first.
pub fn applied_migrations() -> stmt::Query {
    let mut query = stmt::Query::new(MIGRATIONS_TABLE);
    query
        .select(["id", "name", "timestamp", "applied"])
        .order_by("id", false);
    query
}
