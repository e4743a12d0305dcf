use super::{Formatter, Params, ToSql};

use tabula_core::{driver::Flavor, schema::DataType, schema::FieldMapping};

/// Column type of a field, spelled for the active flavor.
pub(super) struct ColumnType<'a>(pub(super) &'a FieldMapping);

impl ToSql for ColumnType<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        use std::fmt::Write;

        let field = self.0;
        let flavor = f.serializer.flavor;

        let ty = match (field.ty, flavor) {
            (DataType::Integer, Flavor::Mysql) if field.auto_increment => "INT",
            (DataType::Integer, Flavor::Postgresql) if field.auto_increment => "SERIAL",
            (DataType::Integer, _) => "INTEGER",
            (DataType::Float, Flavor::Mysql) => "DOUBLE",
            (DataType::Float, Flavor::Postgresql) => "DOUBLE PRECISION",
            (DataType::Float, Flavor::Sqlite) => "REAL",
            (DataType::Text, _) if field.size > 0 => {
                // Writing to a `String` cannot fail
                let _ = write!(f.dst, "VARCHAR({})", field.size);
                return;
            }
            (DataType::Text, _) => "TEXT",
            (DataType::Boolean, _) => "BOOLEAN",
            (DataType::DateTime, Flavor::Postgresql) => "TIMESTAMP",
            (DataType::DateTime, _) => "DATETIME",
            (DataType::Date, _) => "DATE",
            (DataType::Time, _) => "TIME",
            (DataType::Unknown, _) => "TEXT",
        };

        f.dst.push_str(ty);
    }
}
