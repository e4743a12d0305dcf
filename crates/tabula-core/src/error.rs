mod adhoc;
mod already_exists;
mod cancelled;
mod connection_pool;
mod driver_operation_failed;
mod execution;
mod invalid_connection_url;
mod invalid_mapping;
mod invalid_statement;
mod nested_transaction;
mod not_implemented;
mod partial_bulk_failure;
mod record_not_found;
mod schema_introspection;
mod transaction_rolled_back;
mod type_conversion;
mod unsupported_operation;
mod validation;

use adhoc::AdhocError;
use already_exists::AlreadyExistsError;
use cancelled::CancelledError;
use connection_pool::ConnectionPoolError;
use driver_operation_failed::DriverOperationFailedError;
use execution::ExecutionError;
use invalid_connection_url::InvalidConnectionUrlError;
use invalid_mapping::InvalidMappingError;
use invalid_statement::InvalidStatementError;
use nested_transaction::NestedTransactionError;
use not_implemented::NotImplementedError;
use partial_bulk_failure::PartialBulkFailureError;
pub use partial_bulk_failure::BulkProgress;
use record_not_found::RecordNotFoundError;
use schema_introspection::SchemaIntrospectionError;
use std::sync::Arc;
use transaction_rolled_back::TransactionRolledBackError;
use type_conversion::TypeConversionError;
use unsupported_operation::UnsupportedOperationError;
use validation::ValidationError;

/// Returns early with an ad-hoc error built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::from_args(format_args!($($arg)*)))
    };
}

/// Creates an ad-hoc error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::from_args(format_args!($($arg)*))
    };
}

/// An error that can occur in Tabula.
///
/// Errors form a chain: each error may carry a cause, added with
/// [`Error::context`]. Displaying an error prints the whole chain, most recent
/// context first, separated by `": "`.
#[derive(Clone)]
pub struct Error {
    inner: Option<Arc<ErrorInner>>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Adds context to this error.
    ///
    /// `self` becomes the cause of `consequent`, which is returned.
    #[inline(always)]
    pub fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;

        match err.inner.as_mut().and_then(Arc::get_mut) {
            Some(inner) if inner.cause.is_none() => {
                inner.cause = Some(self);
                err
            }
            // The consequent is shared or already has a cause; keep its message
            // and attach `self` to a fresh node.
            _ => Error {
                inner: Some(Arc::new(ErrorInner {
                    kind: ErrorKind::Adhoc(AdhocError::new(err.to_string())),
                    cause: Some(self),
                })),
            },
        }
    }

    /// Returns the error this one was caused by, if any.
    pub fn cause(&self) -> Option<&Error> {
        self.inner.as_ref().and_then(|inner| inner.cause.as_ref())
    }

    /// Returns the innermost error of the chain.
    pub fn root(&self) -> &Error {
        let mut err = self;
        while let Some(cause) = err.cause() {
            err = cause;
        }
        err
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.cause()?;
            Some(err)
        }))
    }

    fn kind(&self) -> &ErrorKind {
        self.inner
            .as_ref()
            .map(|inner| &inner.kind)
            .unwrap_or(&ErrorKind::Unknown)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::DriverOperationFailed(err) => Some(err),
            ErrorKind::ConnectionPool(err) => Some(err),
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => self.cause().map(|err| err as _),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            let Some(ref inner) = self.inner else {
                return f.debug_struct("Error").field("kind", &"None").finish();
            };
            f.debug_struct("Error")
                .field("kind", &inner.kind)
                .field("cause", &inner.cause)
                .finish()
        }
    }
}

#[derive(Debug)]
enum ErrorKind {
    Anyhow(anyhow::Error),
    Adhoc(AdhocError),
    AlreadyExists(AlreadyExistsError),
    Cancelled(CancelledError),
    ConnectionPool(ConnectionPoolError),
    DriverOperationFailed(DriverOperationFailedError),
    Execution(ExecutionError),
    InvalidConnectionUrl(InvalidConnectionUrlError),
    InvalidMapping(InvalidMappingError),
    InvalidStatement(InvalidStatementError),
    NestedTransaction(NestedTransactionError),
    NotImplemented(NotImplementedError),
    PartialBulkFailure(PartialBulkFailureError),
    RecordNotFound(RecordNotFoundError),
    SchemaIntrospection(SchemaIntrospectionError),
    TransactionRolledBack(TransactionRolledBackError),
    TypeConversion(TypeConversionError),
    UnsupportedOperation(UnsupportedOperationError),
    Validation(ValidationError),
    Unknown,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            Anyhow(err) => core::fmt::Display::fmt(err, f),
            Adhoc(err) => core::fmt::Display::fmt(err, f),
            AlreadyExists(err) => core::fmt::Display::fmt(err, f),
            Cancelled(err) => core::fmt::Display::fmt(err, f),
            ConnectionPool(err) => core::fmt::Display::fmt(err, f),
            DriverOperationFailed(err) => core::fmt::Display::fmt(err, f),
            Execution(err) => core::fmt::Display::fmt(err, f),
            InvalidConnectionUrl(err) => core::fmt::Display::fmt(err, f),
            InvalidMapping(err) => core::fmt::Display::fmt(err, f),
            InvalidStatement(err) => core::fmt::Display::fmt(err, f),
            NestedTransaction(err) => core::fmt::Display::fmt(err, f),
            NotImplemented(err) => core::fmt::Display::fmt(err, f),
            PartialBulkFailure(err) => core::fmt::Display::fmt(err, f),
            RecordNotFound(err) => core::fmt::Display::fmt(err, f),
            SchemaIntrospection(err) => core::fmt::Display::fmt(err, f),
            TransactionRolledBack(err) => core::fmt::Display::fmt(err, f),
            TypeConversion(err) => core::fmt::Display::fmt(err, f),
            UnsupportedOperation(err) => core::fmt::Display::fmt(err, f),
            Validation(err) => core::fmt::Display::fmt(err, f),
            Unknown => f.write_str("unknown tabula error"),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Some(Arc::new(ErrorInner { kind, cause: None })),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Error {
        Error::from(anyhow::Error::from(err))
    }
}

/// Trait for types that can be converted into an Error.
pub trait IntoError {
    /// Converts this type into an Error.
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}
