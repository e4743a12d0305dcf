use super::FieldMapping;
use crate::{Error, Result};

use std::collections::HashSet;

/// Mapping of a record type to a table.
///
/// Field order is significant: it fixes the column order of INSERT statements
/// and the order values are read back in. A mapping is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    name: String,
    fields: Vec<FieldMapping>,
}

impl TableMapping {
    /// Builds a mapping, rejecting shapes no table can have.
    pub fn new(name: impl Into<String>, fields: Vec<FieldMapping>) -> Result<TableMapping> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(Error::invalid_mapping(name, "table name is empty"));
        }

        if fields.is_empty() {
            return Err(Error::invalid_mapping(name, "mapping has no fields"));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(Error::invalid_mapping(name, "field name is empty"));
            }

            if !seen.insert(field.name.as_str()) {
                return Err(Error::invalid_mapping(
                    name,
                    format!("duplicate field `{}`", field.name),
                ));
            }

            if field.auto_increment && !field.ty.is_integer() {
                return Err(Error::invalid_mapping(
                    name,
                    format!("auto-increment field `{}` is not an integer", field.name),
                ));
            }
        }

        let auto_increment = fields.iter().filter(|f| f.auto_increment).count();
        if auto_increment > 1 {
            return Err(Error::invalid_mapping(
                name,
                format!("{auto_increment} auto-increment fields; at most one is allowed"),
            ));
        }

        Ok(TableMapping { name, fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &FieldMapping> + '_ {
        self.fields.iter().filter(|field| field.primary_key)
    }

    pub fn auto_increment(&self) -> Option<&FieldMapping> {
        self.fields.iter().find(|field| field.auto_increment)
    }

    /// Fields written by INSERT statements, with their positions in the
    /// mapping. Auto-increment fields are assigned by the database.
    pub fn insertable(&self) -> impl Iterator<Item = (usize, &FieldMapping)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.auto_increment)
    }

    /// Fields written by UPDATE statements built from a whole record.
    pub fn updatable(&self) -> impl Iterator<Item = (usize, &FieldMapping)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, field)| !field.auto_increment && !field.primary_key)
    }

    /// Fields with no column in `live`, in mapping order.
    pub fn missing_from<'a>(
        &'a self,
        live: &'a HashSet<String>,
    ) -> impl Iterator<Item = &'a FieldMapping> + 'a {
        self.fields
            .iter()
            .filter(move |field| !live.contains(&field.name))
    }
}
