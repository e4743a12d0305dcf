use super::DataType;
use crate::{stmt::Value, Result};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// A Rust type that can be stored in a single column.
pub trait Primitive: Sized {
    const DATA_TYPE: DataType;
    const NULLABLE: bool = false;

    /// Converts a value read from the database.
    fn load(value: Value) -> Result<Self>;
}

macro_rules! impl_primitive {
    ($data_type:ident => $( $ty:ty ),*) => {
        $(
            impl Primitive for $ty {
                const DATA_TYPE: DataType = DataType::$data_type;

                fn load(value: Value) -> Result<Self> {
                    value.try_into()
                }
            }
        )*
    };
}

impl_primitive!(Integer => i8, i16, i32, i64, u8, u16, u32, u64);
impl_primitive!(Float => f32, f64);
impl_primitive!(Text => String);
impl_primitive!(Boolean => bool);
impl_primitive!(DateTime => DateTime<Utc>, NaiveDateTime);
impl_primitive!(Date => NaiveDate);
impl_primitive!(Time => NaiveTime);

impl<T: Primitive> Primitive for Option<T> {
    const DATA_TYPE: DataType = T::DATA_TYPE;
    const NULLABLE: bool = true;

    fn load(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            value => T::load(value).map(Some),
        }
    }
}
