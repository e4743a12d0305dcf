/// Dialect-neutral column type.
///
/// Each SQL flavor decides how a `DataType` is spelled in DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
    DateTime,
    Date,
    Time,
    Unknown,
}

impl DataType {
    pub fn is_integer(self) -> bool {
        matches!(self, DataType::Integer)
    }

    pub fn is_text(self) -> bool {
        matches!(self, DataType::Text)
    }
}
