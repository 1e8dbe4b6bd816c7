//! Validation results.

use std::collections::BTreeMap;
use std::fmt;

/// Validation messages keyed by dotted field path.
///
/// Holds at most one message per field: the first rule that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `path`, keeping an earlier one if present.
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(path.into()).or_insert_with(|| message.into());
    }

    /// Message for `path`, if that field failed.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.errors.get(path).map(String::as_str)
    }

    /// First message for `prefix` itself or any field nested under it.
    pub fn first_under(&self, prefix: &str) -> Option<&str> {
        self.iter()
            .find(|(path, _)| {
                *path == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('.'))
            })
            .map(|(_, message)| message)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate `(path, message)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", path, message)?;
        }
        Ok(())
    }
}

/// Outcome of validating a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult<T> {
    /// Every field passed; carries the validated value.
    Valid(T),
    /// One or more fields failed.
    Invalid(FieldErrors),
}

impl<T> ValidationResult<T> {
    /// Check if all fields passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Check if any field failed validation.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// The validated value, if valid.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    /// The field errors, if invalid.
    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(errors) => Some(errors),
        }
    }

    /// Message for `path`, if that field failed.
    pub fn error_for(&self, path: &str) -> Option<&str> {
        self.errors().and_then(|errors| errors.get(path))
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            Self::Valid(value) => Ok(value),
            Self::Invalid(errors) => Err(errors),
        }
    }

    /// Map the valid value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ValidationResult<U> {
        match self {
            Self::Valid(value) => ValidationResult::Valid(f(value)),
            Self::Invalid(errors) => ValidationResult::Invalid(errors),
        }
    }
}
