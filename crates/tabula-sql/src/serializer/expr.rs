use super::{params::Param, ColumnRef, Comma, Delimited, Formatter, Params, ToSql};

use tabula_core::stmt::{Condition, Op, Value};

/// Conditions joined with `AND`.
pub(super) struct Conditions<'a>(pub(super) &'a [Condition]);

impl ToSql for Conditions<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        Delimited(self.0, " AND ").to_sql(f);
    }
}

impl ToSql for &Condition {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let column = ColumnRef(&self.column);

        match self.op {
            Op::IsNull | Op::IsNotNull => fmt!(f, column " " self.op.as_str()),
            Op::In => {
                let items = match &self.value {
                    Value::List(items) => &items[..],
                    value => std::slice::from_ref(value),
                };

                if items.is_empty() {
                    // `IN ()` is not valid SQL; nothing can match an empty list
                    fmt!(f, "1 = 0");
                } else {
                    fmt!(f, column " IN (" Comma(items.iter().map(Param)) ")");
                }
            }
            Op::ILike if !f.serializer.is_postgresql() => {
                fmt!(f, "LOWER(" column ") LIKE LOWER(" Param(&self.value) ")");
            }
            op => fmt!(f, column " " op.as_str() " " Param(&self.value)),
        }
    }
}
