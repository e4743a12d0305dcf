use super::Error;

/// The caller's cancellation signal fired before the operation completed.
#[derive(Debug)]
pub(super) struct CancelledError;

impl std::error::Error for CancelledError {}

impl core::fmt::Display for CancelledError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("operation cancelled")
    }
}

impl Error {
    /// Creates a cancellation error.
    pub fn cancelled() -> Error {
        Error::from(super::ErrorKind::Cancelled(CancelledError))
    }

    /// Returns `true` if cancellation appears anywhere in this error's chain.
    ///
    /// A cancelled statement inside a transaction surfaces as a rolled back
    /// transaction caused by the cancellation, so the whole chain is checked.
    pub fn is_cancelled(&self) -> bool {
        self.chain()
            .any(|err| matches!(err.kind(), super::ErrorKind::Cancelled(_)))
    }
}
