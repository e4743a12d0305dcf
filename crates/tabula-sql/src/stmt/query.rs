use tabula_core::stmt::{Condition, Op, Value};

/// A SELECT statement under construction.
///
/// Builder methods accumulate: each call adds to the clause it targets.
/// [`table`](Query::table), [`limit`](Query::limit) and
/// [`offset`](Query::offset) replace the previous value instead.
///
/// Clauses always render in SQL order, whatever order they were added in.
/// Parameters are numbered across the whole statement: WHERE values first,
/// then HAVING values, each in the order they were added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub table: String,
    pub columns: Vec<String>,
    pub joins: Vec<Join>,
    pub conditions: Vec<Condition>,
    pub group_by: Vec<String>,
    pub having: Vec<Condition>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,

    /// Project `COUNT(*)` instead of `columns`.
    pub count: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOn {
    /// `left = right`, both column references
    Columns(String, String),

    /// A trusted SQL fragment, written verbatim
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub on: Option<JoinOn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub desc: bool,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Query {
        Query {
            table: table.into(),
            ..Query::default()
        }
    }

    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = table.into();
        self
    }

    pub fn select<S: Into<String>>(&mut self, columns: impl IntoIterator<Item = S>) -> &mut Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds `column op value` to the WHERE clause.
    pub fn filter(
        &mut self,
        column: impl Into<String>,
        op: Op,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.conditions.push(Condition::new(column, op, value));
        self
    }

    /// Adds a prepared condition to the WHERE clause.
    pub fn condition(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    pub fn join(
        &mut self,
        kind: JoinKind,
        table: impl Into<String>,
        on: impl Into<Option<JoinOn>>,
    ) -> &mut Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: on.into(),
        });
        self
    }

    pub fn group_by<S: Into<String>>(&mut self, columns: impl IntoIterator<Item = S>) -> &mut Self {
        self.group_by.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds `column op value` to the HAVING clause.
    pub fn having(
        &mut self,
        column: impl Into<String>,
        op: Op,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.having.push(Condition::new(column, op, value));
        self
    }

    pub fn order_by(&mut self, column: impl Into<String>, desc: bool) -> &mut Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            desc,
        });
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// A `COUNT(*)` query over the same table, joins and conditions.
    ///
    /// Ordering and the result window are dropped.
    pub fn to_count(&self) -> Query {
        Query {
            columns: vec![],
            order_by: vec![],
            limit: None,
            offset: None,
            count: true,
            ..self.clone()
        }
    }
}

impl JoinOn {
    pub fn columns(left: impl Into<String>, right: impl Into<String>) -> JoinOn {
        JoinOn::Columns(left.into(), right.into())
    }

    pub fn raw(sql: impl Into<String>) -> JoinOn {
        JoinOn::Raw(sql.into())
    }
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
            JoinKind::Cross => "CROSS",
        }
    }
}
