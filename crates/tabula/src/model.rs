use tabula_core::{
    schema::{FieldMapping, TableMapping},
    stmt::{Row, Value},
    Error, Result,
};

use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    fmt,
    sync::Arc,
};

/// A record type stored in one table.
///
/// Implementations describe the table once, pairing every column with a
/// getter and a setter on the record:
///
/// ```
/// use tabula::{Model, ModelSchema, Result};
/// use tabula::schema::FieldMapping;
///
/// #[derive(Debug, Default)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for User {
///     fn schema() -> Result<ModelSchema<Self>> {
///         ModelSchema::<Self>::builder("users")
///             .field(
///                 FieldMapping::of::<i64>("id").primary_key().auto_increment(),
///                 |user| user.id.into(),
///                 |user, value| Ok(user.id = value.try_into()?),
///             )
///             .field(
///                 FieldMapping::of::<String>("name").size(100),
///                 |user| user.name.as_str().into(),
///                 |user, value| Ok(user.name = value.try_into()?),
///             )
///             .build()
///     }
/// }
/// ```
pub trait Model: Default + Send + Sync + Sized + 'static {
    fn schema() -> Result<ModelSchema<Self>>;
}

/// Reads one field of a record as a column value.
pub type Getter<M> = fn(&M) -> Value;

/// Writes a column value into one field of a record.
pub type Setter<M> = fn(&mut M, Value) -> Result<()>;

/// A table mapping together with the accessors that move values between
/// records and rows. Accessors are stored in mapping field order.
pub struct ModelSchema<M> {
    table: Arc<TableMapping>,
    accessors: Vec<Accessor<M>>,
}

struct Accessor<M> {
    get: Getter<M>,
    set: Setter<M>,
}

pub struct ModelSchemaBuilder<M> {
    table: String,
    fields: Vec<FieldMapping>,
    accessors: Vec<Accessor<M>>,
}

impl<M> ModelSchema<M> {
    pub fn builder(table: impl Into<String>) -> ModelSchemaBuilder<M> {
        ModelSchemaBuilder {
            table: table.into(),
            fields: vec![],
            accessors: vec![],
        }
    }

    pub fn table(&self) -> &Arc<TableMapping> {
        &self.table
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    /// Value of the named column on `record`.
    pub fn get(&self, record: &M, column: &str) -> Option<Value> {
        let index = self.table.field_index(column)?;
        Some((self.accessors[index].get)(record))
    }

    pub fn set(&self, record: &mut M, column: &str, value: Value) -> Result<()> {
        let index = self.table.field_index(column).ok_or_else(|| {
            Error::invalid_mapping(self.name(), format!("no field `{column}`"))
        })?;
        (self.accessors[index].set)(record, value)
            .map_err(|err| err.context(tabula_core::err!("reading `{}.{column}`", self.name())))
    }

    /// Values for the columns written by INSERT, in column order.
    pub fn insert_values(&self, record: &M) -> Vec<Value> {
        self.table
            .insertable()
            .map(|(index, _)| (self.accessors[index].get)(record))
            .collect()
    }

    /// `(column, value)` pairs written by a whole-record UPDATE.
    pub fn update_values(&self, record: &M) -> Vec<(String, Value)> {
        self.table
            .updatable()
            .map(|(index, field)| (field.name.clone(), (self.accessors[index].get)(record)))
            .collect()
    }

    /// Primary key `(column, value)` pairs of `record`.
    pub fn key(&self, record: &M) -> Vec<(String, Value)> {
        self.table
            .fields()
            .iter()
            .zip(&self.accessors)
            .filter(|(field, _)| field.primary_key)
            .map(|(field, accessor)| (field.name.clone(), (accessor.get)(record)))
            .collect()
    }
}

impl<M: Default> ModelSchema<M> {
    /// Builds a record from a row, matching columns by name.
    ///
    /// Row columns without a field are ignored; fields without a column keep
    /// their default value.
    pub fn load(&self, row: Row) -> Result<M> {
        let mut record = M::default();
        for (column, value) in row.into_entries() {
            if let Some(index) = self.table.field_index(&column) {
                (self.accessors[index].set)(&mut record, value).map_err(|err| {
                    err.context(tabula_core::err!("reading `{}.{column}`", self.name()))
                })?;
            }
        }
        Ok(record)
    }
}

impl<M> ModelSchemaBuilder<M> {
    pub fn field(mut self, mapping: FieldMapping, get: Getter<M>, set: Setter<M>) -> Self {
        self.fields.push(mapping);
        self.accessors.push(Accessor { get, set });
        self
    }

    pub fn build(self) -> Result<ModelSchema<M>> {
        let table = TableMapping::new(self.table, self.fields)?;
        Ok(ModelSchema {
            table: Arc::new(table),
            accessors: self.accessors,
        })
    }
}

impl<M> Clone for ModelSchema<M> {
    fn clone(&self) -> Self {
        ModelSchema {
            table: self.table.clone(),
            accessors: self
                .accessors
                .iter()
                .map(|accessor| Accessor {
                    get: accessor.get,
                    set: accessor.set,
                })
                .collect(),
        }
    }
}

impl<M> fmt::Debug for ModelSchema<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("table", &self.table)
            .finish()
    }
}

/// Schemas of the registered models, in registration order.
#[derive(Default)]
pub(crate) struct Registry {
    schemas: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    tables: Vec<(TypeId, Arc<TableMapping>)>,
}

impl Registry {
    /// Registers `M`. Registering the same model twice is a no-op; two
    /// models mapped to one table are rejected.
    pub(crate) fn insert<M: Model>(&mut self) -> Result<()> {
        if self.contains(TypeId::of::<M>()) {
            return Ok(());
        }

        let schema = M::schema()?;
        if self.tables().any(|table| table.name() == schema.name()) {
            return Err(Error::invalid_mapping(
                schema.name(),
                format!("`{}` maps to a table that is already registered", type_name::<M>()),
            ));
        }

        self.tables
            .push((TypeId::of::<M>(), schema.table().clone()));
        self.schemas.insert(TypeId::of::<M>(), Arc::new(schema));
        Ok(())
    }

    pub(crate) fn contains(&self, model: TypeId) -> bool {
        self.schemas.contains_key(&model)
    }

    pub(crate) fn schema<M: Model>(&self) -> Result<Arc<ModelSchema<M>>> {
        self.schemas
            .get(&TypeId::of::<M>())
            .cloned()
            .and_then(|schema| schema.downcast().ok())
            .ok_or_else(|| tabula_core::err!("model `{}` is not registered", type_name::<M>()))
    }

    pub(crate) fn table_of(&self, model: TypeId) -> Option<&Arc<TableMapping>> {
        self.tables
            .iter()
            .find(|(id, _)| *id == model)
            .map(|(_, table)| table)
    }

    pub(crate) fn tables(&self) -> impl Iterator<Item = &Arc<TableMapping>> + '_ {
        self.tables.iter().map(|(_, table)| table)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tables().map(|table| table.name()))
            .finish()
    }
}
