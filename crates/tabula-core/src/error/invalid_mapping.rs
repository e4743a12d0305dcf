use super::Error;

/// A table mapping was rejected at construction time.
#[derive(Debug)]
pub(super) struct InvalidMappingError {
    table: Box<str>,
    message: Box<str>,
}

impl std::error::Error for InvalidMappingError {}

impl core::fmt::Display for InvalidMappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if self.table.is_empty() {
            write!(f, "invalid mapping: {}", self.message)
        } else {
            write!(f, "invalid mapping for `{}`: {}", self.table, self.message)
        }
    }
}

impl Error {
    /// Creates an invalid mapping error.
    pub fn invalid_mapping(table: impl Into<String>, message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidMapping(InvalidMappingError {
            table: table.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid mapping error.
    pub fn is_invalid_mapping(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidMapping(_))
    }
}
