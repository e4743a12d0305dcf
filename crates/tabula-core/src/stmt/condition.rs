use super::{Op, Value};

/// `column op value`, one term of a WHERE or HAVING clause.
///
/// Conditions are rendered in the order they are added, and that order also
/// fixes the order of their parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Condition {
        Condition {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(column, Op::Eq, value)
    }

    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(column, Op::Ne, value)
    }

    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(column, Op::Gt, value)
    }

    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(column, Op::Ge, value)
    }

    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(column, Op::Lt, value)
    }

    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Condition {
        Condition::new(column, Op::Le, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<Value>) -> Condition {
        Condition::new(column, Op::Like, pattern)
    }

    pub fn in_list<T: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Condition {
        Condition::new(
            column,
            Op::In,
            Value::List(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn is_null(column: impl Into<String>) -> Condition {
        Condition::new(column, Op::IsNull, Value::Null)
    }

    pub fn is_not_null(column: impl Into<String>) -> Condition {
        Condition::new(column, Op::IsNotNull, Value::Null)
    }
}
