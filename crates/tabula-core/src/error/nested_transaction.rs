use super::Error;

/// A transaction was started from a handle already bound to a transaction.
#[derive(Debug)]
pub(super) struct NestedTransactionError;

impl std::error::Error for NestedTransactionError {}

impl core::fmt::Display for NestedTransactionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("nested transactions are not supported")
    }
}

impl Error {
    /// Creates a nested transaction error.
    pub fn nested_transaction() -> Error {
        Error::from(super::ErrorKind::NestedTransaction(NestedTransactionError))
    }

    /// Returns `true` if this error is a nested transaction error.
    pub fn is_nested_transaction(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NestedTransaction(_))
    }
}
