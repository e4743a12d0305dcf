use super::{DataType, Primitive};

/// Mapping of one record field to one table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Column name
    pub name: String,

    /// Column type
    pub ty: DataType,

    /// Maximum length for text columns. Zero means unbounded.
    pub size: usize,

    pub primary_key: bool,

    pub auto_increment: bool,

    pub nullable: bool,

    pub unique: bool,
}

impl FieldMapping {
    pub fn new(name: impl Into<String>, ty: DataType) -> FieldMapping {
        FieldMapping {
            name: name.into(),
            ty,
            size: 0,
            primary_key: false,
            auto_increment: false,
            nullable: false,
            unique: false,
        }
    }

    /// Creates a mapping whose type and nullability follow the Rust type `T`.
    pub fn of<T: Primitive>(name: impl Into<String>) -> FieldMapping {
        let mut field = FieldMapping::new(name, T::DATA_TYPE);
        field.nullable = T::NULLABLE;
        field
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}
