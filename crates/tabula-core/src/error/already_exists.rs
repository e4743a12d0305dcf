use super::Error;

/// The database object a DDL statement tried to create is already there.
///
/// Raised when two processes reconcile the same schema concurrently. Callers
/// running migrations treat it as success.
#[derive(Debug)]
pub(super) struct AlreadyExistsError {
    object: Box<str>,
}

impl std::error::Error for AlreadyExistsError {}

impl core::fmt::Display for AlreadyExistsError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{} already exists", self.object)
    }
}

impl Error {
    /// Creates an error reporting that a table, column or index already exists.
    pub fn already_exists(object: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::AlreadyExists(AlreadyExistsError {
            object: object.into().into(),
        }))
    }

    /// Returns `true` if this error reports an object that already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::AlreadyExists(_))
    }
}
