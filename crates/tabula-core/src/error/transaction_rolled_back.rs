use super::Error;

/// A transaction was rolled back. The cause explains why.
#[derive(Debug)]
pub(super) struct TransactionRolledBackError;

impl std::error::Error for TransactionRolledBackError {}

impl core::fmt::Display for TransactionRolledBackError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("transaction rolled back")
    }
}

impl Error {
    /// Creates a transaction rolled back error.
    pub fn transaction_rolled_back() -> Error {
        Error::from(super::ErrorKind::TransactionRolledBack(
            TransactionRolledBackError,
        ))
    }

    /// Returns `true` if this error is a transaction rolled back error.
    pub fn is_transaction_rolled_back(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::TransactionRolledBack(_))
    }
}
