use super::{Formatter, ToSql};

use tabula_core::{driver::Flavor, stmt::Value};

/// Collects statement parameters as placeholders are written.
pub trait Params {
    /// Stores `param` and returns the placeholder that refers to it.
    fn push(&mut self, param: &Value) -> Placeholder;
}

/// Reference to a parameter by its 1-based position in the final parameter
/// list of the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: super::Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;

        // Writing to a `String` cannot fail
        let _ = match f.serializer.flavor {
            Flavor::Mysql | Flavor::Sqlite => write!(f.dst, "?"),
            Flavor::Postgresql => write!(f.dst, "${}", self.0),
        };
    }
}

/// A parameter value, pushed when written.
pub(super) struct Param<'a>(pub(super) &'a Value);

impl ToSql for Param<'_> {
    fn to_sql<P: super::Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = f.params.push(self.0);
        placeholder.to_sql(f);
    }
}
