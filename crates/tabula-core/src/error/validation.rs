use super::Error;

/// A record failed a validation rule. No SQL was issued.
#[derive(Debug)]
pub(super) struct ValidationError {
    pub(super) field: Box<str>,
    pub(super) rule: Box<str>,
    pub(super) message: Box<str>,
}

impl std::error::Error for ValidationError {}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "validation failed for `{}` ({}): {}",
            self.field, self.rule, self.message
        )
    }
}

impl Error {
    /// Creates a validation error for `field`, naming the failed `rule`.
    pub fn validation(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationError {
            field: field.into().into(),
            rule: rule.into().into(),
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Validation(_))
    }

    /// Returns the field and rule of a validation error.
    pub fn validation_failure(&self) -> Option<(&str, &str)> {
        match self.kind() {
            super::ErrorKind::Validation(err) => Some((&err.field, &err.rule)),
            _ => None,
        }
    }
}
