use super::Serializer;

use tabula_core::{driver::Flavor, Error};

impl Serializer {
    /// Recognizes driver errors reporting that a DDL target already exists and
    /// turns them into the recoverable `AlreadyExists` kind. Other errors are
    /// returned unchanged.
    ///
    /// `object` names what the statement tried to create, for the message.
    pub fn classify_ddl_error(&self, err: Error, object: &str) -> Error {
        let message = err.to_string();
        let message = message.to_ascii_lowercase();

        let exists = match self.flavor {
            // ER_DUP_FIELDNAME (1060) and ER_TABLE_EXISTS_ERROR (1050)
            Flavor::Mysql => {
                message.contains("duplicate column name") || message.contains("already exists")
            }
            // SQLSTATE 42701 (duplicate_column) and 42P07 (duplicate_table)
            Flavor::Postgresql => message.contains("already exists"),
            Flavor::Sqlite => {
                message.contains("duplicate column name") || message.contains("already exists")
            }
        };

        if exists {
            err.context(Error::already_exists(object))
        } else {
            err
        }
    }
}
