use super::{Formatter, Params, ToSql};

use tabula_core::driver::Flavor;

/// A quoted identifier. Embedded quote characters are doubled.
pub(super) struct Ident<S>(pub(super) S);

/// A column reference as written by the caller.
///
/// `table.column` quotes each segment; `*`, `t.*` and expressions such as
/// `COUNT(id)` are written as-is.
pub(super) struct ColumnRef<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let quote = match f.serializer.flavor {
            Flavor::Mysql => '`',
            Flavor::Postgresql | Flavor::Sqlite => '"',
        };

        f.dst.push(quote);
        for c in self.0.as_ref().chars() {
            if c == quote {
                f.dst.push(quote);
            }
            f.dst.push(c);
        }
        f.dst.push(quote);
    }
}

impl<S: AsRef<str>> ToSql for ColumnRef<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let name = self.0.as_ref();

        if name.contains('(') {
            f.dst.push_str(name);
            return;
        }

        let mut s = "";
        for segment in name.split('.') {
            f.dst.push_str(s);
            if segment == "*" {
                f.dst.push('*');
            } else {
                Ident(segment).to_sql(f);
            }
            s = ".";
        }
    }
}
