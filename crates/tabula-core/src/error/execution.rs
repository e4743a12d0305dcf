use super::Error;

/// A statement failed to execute.
///
/// Wraps the driver failure (the cause) together with the statement text.
/// Parameter values are never included.
#[derive(Debug)]
pub(super) struct ExecutionError {
    statement: Box<str>,
}

impl std::error::Error for ExecutionError {}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "failed to execute `{}`", self.statement)
    }
}

impl Error {
    /// Creates an execution error for the given statement. Attach the driver
    /// failure with [`Error::context`].
    pub fn execution(statement: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Execution(ExecutionError {
            statement: statement.into().into(),
        }))
    }

    /// Returns `true` if this error is an execution failure.
    pub fn is_execution(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Execution(_))
    }

    /// Returns the statement that failed, if this is an execution failure.
    pub fn statement(&self) -> Option<&str> {
        match self.kind() {
            super::ErrorKind::Execution(err) => Some(&err.statement),
            _ => None,
        }
    }
}
