use tabula_core::stmt::{Condition, Value};

/// `UPDATE .. SET .. WHERE ..`
///
/// SET values are bound before WHERE values, so placeholder numbering runs
/// across both clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub table: String,
    pub assignments: Vec<(String, Value)>,
    pub conditions: Vec<Condition>,
}

impl Update {
    pub fn new(table: impl Into<String>) -> Update {
        Update {
            table: table.into(),
            assignments: vec![],
            conditions: vec![],
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    pub fn filter(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }
}
