use super::Error;

/// A catalog query used to inspect the live schema failed or returned
/// something unusable.
#[derive(Debug)]
pub(super) struct SchemaIntrospectionError {
    table: Box<str>,
    message: Box<str>,
}

impl std::error::Error for SchemaIntrospectionError {}

impl core::fmt::Display for SchemaIntrospectionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "failed to inspect schema of `{}`: {}",
            self.table, self.message
        )
    }
}

impl Error {
    /// Creates a schema introspection error for `table`.
    pub fn schema_introspection(table: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SchemaIntrospection(
            SchemaIntrospectionError {
                table: table.into().into(),
                message: message.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is a schema introspection error.
    pub fn is_schema_introspection(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::SchemaIntrospection(_))
    }
}
