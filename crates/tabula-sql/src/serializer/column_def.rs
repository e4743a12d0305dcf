use super::{ty::ColumnType, Formatter, Ident, Params, ToSql};

use tabula_core::{driver::Flavor, schema::FieldMapping};

/// A column definition as written in CREATE TABLE or ADD COLUMN.
pub(super) struct ColumnDef<'a> {
    pub(super) field: &'a FieldMapping,

    /// Auto-increment syntax is only emitted when creating the table.
    pub(super) create_table: bool,
}

impl ToSql for ColumnDef<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let field = self.field;

        fmt!(f, Ident(&field.name) " " ColumnType(field));

        if !field.nullable {
            fmt!(f, " NOT NULL");
        }

        if self.create_table && field.auto_increment {
            match f.serializer.flavor {
                Flavor::Mysql => fmt!(f, " AUTO_INCREMENT"),
                // SERIAL already implies a sequence
                Flavor::Postgresql => {}
                Flavor::Sqlite => fmt!(f, " PRIMARY KEY AUTOINCREMENT"),
            }
        }

        if field.unique {
            fmt!(f, " UNIQUE");
        }
    }
}
