use super::Error;

/// The active SQL flavor cannot express the requested operation.
#[derive(Debug)]
pub(super) struct UnsupportedOperationError {
    operation: Box<str>,
    target: Box<str>,
}

impl std::error::Error for UnsupportedOperationError {}

impl core::fmt::Display for UnsupportedOperationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{} is not supported by {}", self.operation, self.target)
    }
}

impl Error {
    /// Creates an unsupported operation error. `target` names the database
    /// flavor or model that cannot perform `operation`.
    pub fn unsupported_operation(
        operation: impl Into<String>,
        target: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::UnsupportedOperation(
            UnsupportedOperationError {
                operation: operation.into().into(),
                target: target.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is an unsupported operation error.
    pub fn is_unsupported_operation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedOperation(_))
    }
}
