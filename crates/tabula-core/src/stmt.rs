//! Values and conditions passed between the mapping layer and SQL generation.

mod condition;
pub use condition::Condition;

mod op;
pub use op::Op;

mod row;
pub use row::Row;

mod value;
pub use value::Value;
