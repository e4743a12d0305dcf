use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use tabula_core::stmt::Value as CoreValue;

/// Bridges core values to and from SQLite's storage classes.
#[derive(Debug)]
pub struct Value<'a>(pub &'a CoreValue);

impl Value<'_> {
    /// Converts a SQLite value read from a row into a core value.
    ///
    /// SQLite has no date, time or boolean storage class: those come back as
    /// text or integers and are converted by the model field that loads them.
    pub fn from_sql(value: ValueRef<'_>) -> CoreValue {
        match value {
            ValueRef::Null => CoreValue::Null,
            ValueRef::Integer(v) => CoreValue::I64(v),
            ValueRef::Real(v) => CoreValue::F64(v),
            ValueRef::Text(v) => CoreValue::String(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => CoreValue::String(String::from_utf8_lossy(v).into_owned()),
        }
    }
}

impl ToSql for Value<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            CoreValue::Bool(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v as i64))),
            CoreValue::I64(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            CoreValue::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            CoreValue::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            CoreValue::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            CoreValue::Timestamp(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true),
            ))),
            CoreValue::Date(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format("%Y-%m-%d").to_string(),
            ))),
            CoreValue::Time(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format("%H:%M:%S%.f").to_string(),
            ))),
            CoreValue::List(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                "list values must be expanded into one parameter per element".into(),
            )),
        }
    }
}
