//! Statements understood by the [`Serializer`](crate::Serializer).

mod add_column;
pub use add_column::AddColumn;

mod create_index;
pub use create_index::CreateIndex;

mod create_table;
pub use create_table::CreateTable;

mod delete;
pub use delete::Delete;

mod drop_column;
pub use drop_column::DropColumn;

mod insert;
pub use insert::Insert;

mod introspect;
pub use introspect::{ListColumns, TableExists};

mod query;
pub use query::{Join, JoinKind, JoinOn, OrderBy, Query};

mod update;
pub use update::Update;

pub use tabula_core::stmt::{Condition, Op, Row, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    AddColumn(AddColumn),
    CreateIndex(CreateIndex),
    CreateTable(CreateTable),
    Delete(Delete),
    DropColumn(DropColumn),
    Insert(Insert),
    ListColumns(ListColumns),
    Query(Query),
    TableExists(TableExists),
    Update(Update),
}

impl Statement {
    /// Returns `true` for statements that change the schema.
    pub fn is_ddl(&self) -> bool {
        matches!(
            self,
            Statement::AddColumn(_)
                | Statement::CreateIndex(_)
                | Statement::CreateTable(_)
                | Statement::DropColumn(_)
        )
    }

    /// Short lowercase name of the statement, used to label measurements.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::AddColumn(_) => "add_column",
            Statement::CreateIndex(_) => "create_index",
            Statement::CreateTable(_) => "create_table",
            Statement::Delete(_) => "delete",
            Statement::DropColumn(_) => "drop_column",
            Statement::Insert(_) => "insert",
            Statement::ListColumns(_) | Statement::TableExists(_) => "introspect",
            Statement::Query(_) => "select",
            Statement::Update(_) => "update",
        }
    }

    /// Table the statement reads or changes.
    pub fn table(&self) -> &str {
        match self {
            Statement::AddColumn(stmt) => &stmt.table,
            Statement::CreateIndex(stmt) => &stmt.table,
            Statement::CreateTable(stmt) => stmt.table.name(),
            Statement::Delete(stmt) => &stmt.table,
            Statement::DropColumn(stmt) => &stmt.table,
            Statement::Insert(stmt) => &stmt.table,
            Statement::ListColumns(stmt) => &stmt.table,
            Statement::Query(stmt) => &stmt.table,
            Statement::TableExists(stmt) => &stmt.table,
            Statement::Update(stmt) => &stmt.table,
        }
    }

    /// Returns `true` for statements that produce rows.
    pub fn returns_rows(&self) -> bool {
        match self {
            Statement::Query(_) | Statement::ListColumns(_) | Statement::TableExists(_) => true,
            Statement::Insert(insert) => insert.returning.is_some(),
            _ => false,
        }
    }
}

macro_rules! impl_from_stmt {
    ($( $variant:ident ),*) => {
        $(
            impl From<$variant> for Statement {
                fn from(value: $variant) -> Self {
                    Statement::$variant(value)
                }
            }
        )*
    };
}

impl_from_stmt!(
    AddColumn,
    CreateIndex,
    CreateTable,
    Delete,
    DropColumn,
    Insert,
    ListColumns,
    Query,
    TableExists,
    Update
);
