use super::{
    expr::Conditions, params::Param, ColumnDef, ColumnRef, Comma, Formatter, Ident, Params, ToSql,
};

use crate::stmt::{self, Statement};
use tabula_core::driver::Flavor;

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Statement::AddColumn(stmt) => stmt.to_sql(f),
            Statement::CreateIndex(stmt) => stmt.to_sql(f),
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::DropColumn(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::ListColumns(stmt) => stmt.to_sql(f),
            Statement::Query(stmt) => stmt.to_sql(f),
            Statement::TableExists(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

struct ColumnsWithConstraints<'a>(&'a stmt::CreateTable);

impl ToSql for ColumnsWithConstraints<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = &self.0.table;

        // SQLite declares an auto-incrementing primary key inline
        let inline_pk = |name: &str| {
            f.serializer.is_sqlite()
                && table
                    .auto_increment()
                    .is_some_and(|field| field.name == name)
        };
        let trailing_pk: Vec<_> = table
            .primary_key()
            .filter(|field| !inline_pk(&field.name))
            .map(|field| Ident(&field.name))
            .collect();

        let fields = table.fields();
        for (index, field) in fields.iter().enumerate() {
            let column = ColumnDef {
                field,
                create_table: true,
            };
            fmt!(f, "\n    " column);
            if index < fields.len() - 1 || !trailing_pk.is_empty() {
                fmt!(f, ",");
            }
        }

        if !trailing_pk.is_empty() {
            fmt!(f, "\n    PRIMARY KEY (" Comma(trailing_pk) ")");
        }

        fmt!(f, "\n");
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(self.table.name());
        let columns = ColumnsWithConstraints(self);

        fmt!(f, "CREATE TABLE IF NOT EXISTS " name " (" columns ")");

        if f.serializer.is_mysql() {
            fmt!(f, " ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci");
        }
    }
}

impl ToSql for &stmt::AddColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let column = ColumnDef {
            field: &self.column,
            create_table: false,
        };

        fmt!(f, "ALTER TABLE " Ident(&self.table) " ADD COLUMN " column);
    }
}

impl ToSql for &stmt::DropColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "ALTER TABLE " Ident(&self.table) " DROP COLUMN " Ident(&self.column));
    }
}

impl ToSql for &stmt::CreateIndex {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let unique = if self.unique { "UNIQUE " } else { "" };
        let columns = Comma(self.columns.iter().map(Ident));

        fmt!(
            f, "CREATE " unique "INDEX " Ident(&self.name) " ON " Ident(&self.table) " (" columns ")"
        );
    }
}

impl ToSql for &stmt::Query {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "SELECT ");

        if self.count {
            fmt!(f, "COUNT(*)");
        } else if self.columns.is_empty() {
            fmt!(f, "*");
        } else {
            fmt!(f, Comma(self.columns.iter().map(ColumnRef)));
        }

        fmt!(f, " FROM " Ident(&self.table));

        for join in &self.joins {
            fmt!(f, " " join.kind.as_str() " JOIN " ColumnRef(&join.table));

            match &join.on {
                Some(stmt::JoinOn::Columns(left, right)) => {
                    fmt!(f, " ON " ColumnRef(left) " = " ColumnRef(right));
                }
                Some(stmt::JoinOn::Raw(sql)) => fmt!(f, " ON " sql),
                None => {}
            }
        }

        if !self.conditions.is_empty() {
            fmt!(f, " WHERE " Conditions(&self.conditions));
        }

        if !self.group_by.is_empty() {
            fmt!(f, " GROUP BY " Comma(self.group_by.iter().map(ColumnRef)));
        }

        if !self.having.is_empty() {
            fmt!(f, " HAVING " Conditions(&self.having));
        }

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        match (self.limit, self.offset) {
            (Some(limit), offset) => {
                fmt!(f, " LIMIT " limit);
                if let Some(offset) = offset {
                    fmt!(f, " OFFSET " offset);
                }
            }
            (None, Some(offset)) => {
                // MySQL and SQLite only accept OFFSET after a LIMIT
                match f.serializer.flavor {
                    Flavor::Mysql => fmt!(f, " LIMIT 18446744073709551615"),
                    Flavor::Sqlite => fmt!(f, " LIMIT -1"),
                    Flavor::Postgresql => {}
                }
                fmt!(f, " OFFSET " offset);
            }
            (None, None) => {}
        }
    }
}

impl ToSql for &stmt::OrderBy {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, ColumnRef(&self.column));
        if self.desc {
            fmt!(f, " DESC");
        }
    }
}

struct ValuesRow<'a>(&'a [stmt::Value]);

impl ToSql for ValuesRow<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "(" Comma(self.0.iter().map(Param)) ")");
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "INSERT INTO " Ident(&self.table));

        if self.columns.is_empty() {
            // Every column is generated; the rows carry no values
            match f.serializer.flavor {
                Flavor::Mysql => fmt!(f, " () VALUES ()"),
                Flavor::Postgresql | Flavor::Sqlite => fmt!(f, " DEFAULT VALUES"),
            }
        } else {
            let columns = Comma(self.columns.iter().map(Ident));
            let rows = Comma(self.rows.iter().map(|row| ValuesRow(row)));
            fmt!(f, " (" columns ") VALUES " rows);
        }

        if let Some(returning) = &self.returning {
            if f.serializer.capability().returning {
                fmt!(f, " RETURNING " Ident(returning));
            }
        }
    }
}

struct Assignment<'a>(&'a (String, stmt::Value));

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let (column, value) = self.0;
        fmt!(f, Ident(column) " = " Param(value));
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let assignments = Comma(self.assignments.iter().map(Assignment));
        fmt!(f, "UPDATE " Ident(&self.table) " SET " assignments);

        if !self.conditions.is_empty() {
            fmt!(f, " WHERE " Conditions(&self.conditions));
        }
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "DELETE FROM " Ident(&self.table));

        if !self.conditions.is_empty() {
            fmt!(f, " WHERE " Conditions(&self.conditions));
        }
    }
}

impl ToSql for &stmt::TableExists {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = stmt::Value::String(self.table.clone());
        let table = Param(&name);

        match f.serializer.flavor {
            Flavor::Mysql => fmt!(
                f,
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = " table ")"
            ),
            Flavor::Postgresql => fmt!(
                f,
                "SELECT EXISTS (SELECT 1 FROM pg_tables WHERE schemaname = current_schema() AND tablename = " table ")"
            ),
            Flavor::Sqlite => fmt!(
                f,
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = " table ")"
            ),
        }
    }
}

impl ToSql for &stmt::ListColumns {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = stmt::Value::String(self.table.clone());
        let table = Param(&name);

        match f.serializer.flavor {
            Flavor::Mysql => fmt!(
                f,
                "SELECT column_name FROM information_schema.columns WHERE table_schema = DATABASE() AND table_name = " table " ORDER BY ordinal_position"
            ),
            Flavor::Postgresql => fmt!(
                f,
                "SELECT column_name FROM information_schema.columns WHERE table_schema = current_schema() AND table_name = " table " ORDER BY ordinal_position"
            ),
            Flavor::Sqlite => fmt!(f, "SELECT name FROM pragma_table_info(" table ")"),
        }
    }
}
