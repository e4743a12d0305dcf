use super::Error;

/// The requested operation exists in the API but has no implementation.
#[derive(Debug)]
pub(super) struct NotImplementedError {
    operation: Box<str>,
}

impl std::error::Error for NotImplementedError {}

impl core::fmt::Display for NotImplementedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "`{}` is not implemented", self.operation)
    }
}

impl Error {
    /// Creates a not implemented error for the named operation.
    pub fn not_implemented(operation: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NotImplemented(NotImplementedError {
            operation: operation.into().into(),
        }))
    }

    /// Returns `true` if this error is a not implemented error.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NotImplemented(_))
    }
}
