#[macro_use]
mod fmt;
use fmt::ToSql;

mod classify;

mod column_def;
use column_def::ColumnDef;

mod delim;
use delim::{Comma, Delimited};

mod expr;

mod flavor;

mod ident;
use ident::{ColumnRef, Ident};

mod params;
pub use params::{Params, Placeholder};

mod statement;

mod ty;

use crate::stmt::{self, Statement};

use tabula_core::{
    driver::{Capability, Flavor},
    schema::{FieldMapping, TableMapping},
    stmt::Value,
    Error, Result,
};

/// Serialize a statement to a SQL string
#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    /// The database flavor handles the differences between SQL dialects and
    /// supported features.
    flavor: Flavor,
}

/// SQL text and the parameters it binds, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    pub text: String,
    pub params: Vec<Value>,
}

/// Transaction control statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Start,
    Commit,
    Rollback,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer {
    pub fn new(flavor: Flavor) -> Serializer {
        Serializer { flavor }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn capability(&self) -> &'static Capability {
        Capability::of(self.flavor)
    }

    /// Serializes `stmt`, pushing its parameters onto `params` in the order
    /// their placeholders appear.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> Result<String> {
        self.check(stmt)?;

        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        Ok(ret)
    }

    /// Serializes `stmt` into SQL text with a fresh parameter list.
    pub fn build(&self, stmt: &Statement) -> Result<Sql> {
        let mut params = Vec::new();
        let text = self.serialize(stmt, &mut params)?;
        Ok(Sql { text, params })
    }

    /// Serialize a transaction control operation to a SQL string.
    pub fn serialize_transaction(&self, op: Transaction) -> &'static str {
        match op {
            Transaction::Start => match self.flavor {
                Flavor::Mysql => "START TRANSACTION",
                Flavor::Postgresql | Flavor::Sqlite => "BEGIN",
            },
            Transaction::Commit => "COMMIT",
            Transaction::Rollback => "ROLLBACK",
        }
    }

    /// Quotes an identifier for this flavor.
    pub fn quote(&self, ident: &str) -> String {
        self.fragment(Ident(ident))
    }

    /// Placeholder text for the parameter at 1-based position `index`.
    pub fn placeholder(&self, index: usize) -> String {
        self.fragment(Placeholder(index))
    }

    /// Column type of `field` in DDL.
    pub fn data_type(&self, field: &FieldMapping) -> String {
        self.fragment(ty::ColumnType(field))
    }

    /// Keyword(s) marking a column as auto-incrementing. Empty for PostgreSQL,
    /// which uses the `SERIAL` type instead.
    pub fn auto_increment(&self) -> &'static str {
        match self.flavor {
            Flavor::Mysql => "AUTO_INCREMENT",
            Flavor::Postgresql => "",
            Flavor::Sqlite => "AUTOINCREMENT",
        }
    }

    pub fn create_table(&self, table: &TableMapping) -> Result<String> {
        self.ddl(stmt::CreateTable::new(table).into())
    }

    pub fn add_column(&self, table: &str, field: &FieldMapping) -> Result<String> {
        self.ddl(stmt::AddColumn::new(table, field.clone()).into())
    }

    pub fn drop_column(&self, table: &str, column: &str) -> Result<String> {
        self.ddl(stmt::DropColumn::new(table, column).into())
    }

    pub fn create_index(
        &self,
        table: &str,
        name: &str,
        columns: &[&str],
        unique: bool,
    ) -> Result<String> {
        let mut index = stmt::CreateIndex::new(name, table, columns.iter().copied());
        if unique {
            index = index.unique();
        }
        self.ddl(index.into())
    }

    fn ddl(&self, stmt: Statement) -> Result<String> {
        let sql = self.build(&stmt)?;
        debug_assert!(sql.params.is_empty(), "DDL statements bind no parameters");
        Ok(sql.text)
    }

    /// Rejects statements the flavor cannot express.
    fn check(&self, stmt: &Statement) -> Result<()> {
        match stmt {
            Statement::DropColumn(_) if !self.capability().drop_column => Err(
                Error::unsupported_operation("DROP COLUMN", self.flavor.name()),
            ),
            Statement::CreateTable(stmt) if self.is_sqlite() => {
                let table = &stmt.table;
                let Some(auto_increment) = table.auto_increment() else {
                    return Ok(());
                };
                let mut pk = table.primary_key();
                match (pk.next(), pk.next()) {
                    (Some(field), None) if field.name == auto_increment.name => Ok(()),
                    _ => Err(Error::unsupported_operation(
                        format!(
                            "AUTOINCREMENT on `{}` unless it is the only primary key column",
                            auto_increment.name
                        ),
                        self.flavor.name(),
                    )),
                }
            }
            Statement::Insert(stmt) if stmt.rows.is_empty() => Err(Error::invalid_statement(
                format!("INSERT into `{}` has no rows", stmt.table),
            )),
            Statement::Insert(stmt) => {
                let width = stmt.columns.len();
                match stmt.rows.iter().position(|row| row.len() != width) {
                    Some(i) => Err(Error::invalid_statement(format!(
                        "INSERT row {i} has a different number of values than columns ({width})"
                    ))),
                    None if width == 0 && stmt.rows.len() > 1 => Err(Error::invalid_statement(
                        "multi-row INSERT needs at least one column",
                    )),
                    None => Ok(()),
                }
            }
            Statement::Update(stmt) if stmt.assignments.is_empty() => Err(
                Error::invalid_statement(format!("UPDATE of `{}` sets no columns", stmt.table)),
            ),
            _ => Ok(()),
        }
    }

    fn fragment(&self, fragment: impl ToSql) -> String {
        let mut dst = String::new();
        let mut params = Vec::<Value>::new();
        let mut f = Formatter {
            serializer: self,
            dst: &mut dst,
            params: &mut params,
        };
        fragment.to_sql(&mut f);
        dst
    }

    fn is_sqlite(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite)
    }

    fn is_mysql(&self) -> bool {
        matches!(self.flavor, Flavor::Mysql)
    }

    fn is_postgresql(&self) -> bool {
        matches!(self.flavor, Flavor::Postgresql)
    }
}
