//! Static description of how record types correspond to tables.

mod field;
pub use field::FieldMapping;

mod primitive;
pub use primitive::Primitive;

mod relation;
pub use relation::{JoinTable, Relation, RelationKind};

mod table;
pub use table::TableMapping;

mod ty;
pub use ty::DataType;
